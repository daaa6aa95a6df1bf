//! # Order flow API
//!
//! The checkout, payment-verification and order-lifecycle operations. Everything the flow needs is
//! injected: the database backend, the cache, the payment gateway client, and the notifier.
//!
//! There are two checkout paths. The direct path (`cod`) persists an order immediately with
//! payment status `Unpaid`. The gateway path persists *nothing*: it creates a remote payment
//! intent carrying the buyer and address ids as metadata, and only a subsequent, signature-checked
//! verification call writes an order, already `Paid`, in the same atomic shape as the direct path.

use std::{collections::HashMap, fmt::Debug, sync::Arc};

use log::{debug, error, warn};
use market_common::{Secret, DEFAULT_CURRENCY_CODE};

use crate::{
    cache::{keys, CacheSource, MarketCache, DEFAULT_CACHE_TTL},
    db_types::{Address, NewOrder, Order, OrderId, OrderStatus, PaymentStatus},
    helpers::verify_payment_signature,
    order_manager::{
        errors::OrderFlowError,
        order_objects::{CheckoutOutcome, OrderDetail, OrderQueryFilter, Pagination},
    },
    pricing::{self, PricedLine},
    traits::{
        AuthManagement,
        CartManagement,
        CatalogManagement,
        ConfirmationLine,
        NewPaymentIntent,
        OrderConfirmation,
        OrderManagement,
        OrderNotifier,
        PaymentGateway,
    },
};

pub const DIRECT_PAYMENT_METHOD: &str = "cod";
pub const GATEWAY_PAYMENT_METHOD: &str = "razorpay";

const NOTE_BUYER_ID: &str = "buyer_id";
const NOTE_ADDRESS_ID: &str = "address_id";

pub struct OrderFlowApi<B> {
    db: B,
    cache: MarketCache,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn OrderNotifier>,
    signature_secret: Secret<String>,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement + CartManagement + CatalogManagement + AuthManagement + Send + Sync + 'static
{
    pub fn new(
        db: B,
        cache: MarketCache,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn OrderNotifier>,
        signature_secret: Secret<String>,
    ) -> Self {
        Self { db, cache, gateway, notifier, signature_secret }
    }

    /// Start a checkout for everything in the buyer's cart.
    ///
    /// `cod` places the order right away. `razorpay` creates a remote payment intent and returns
    /// it without touching the local store; the order is created later by [`Self::verify_payment`].
    pub async fn place_order(
        &self,
        buyer_id: i64,
        address_id: i64,
        payment_method: &str,
    ) -> Result<CheckoutOutcome, OrderFlowError> {
        let (lines, total, address) = self.checkout_context(buyer_id, address_id).await?;
        match payment_method {
            DIRECT_PAYMENT_METHOD => {
                let order = NewOrder {
                    order_id: OrderId::random(),
                    buyer_id,
                    total,
                    payment_method: DIRECT_PAYMENT_METHOD.to_string(),
                    payment_status: PaymentStatus::Unpaid,
                    payment_txid: None,
                    address_id: Some(address.id),
                };
                let detail = self.persist_order(order, &lines, address).await?;
                Ok(CheckoutOutcome::Placed { order: detail })
            },
            GATEWAY_PAYMENT_METHOD => {
                let notes = HashMap::from([
                    (NOTE_BUYER_ID.to_string(), buyer_id.to_string()),
                    (NOTE_ADDRESS_ID.to_string(), address.id.to_string()),
                ]);
                let intent = self
                    .gateway
                    .create_intent(NewPaymentIntent {
                        amount: total,
                        currency: DEFAULT_CURRENCY_CODE.to_string(),
                        receipt: format!("rcpt-{:08x}", rand::random::<u32>()),
                        notes,
                    })
                    .await?;
                debug!("🔄️ Created payment intent {} for buyer #{buyer_id}, amount {total}", intent.id);
                Ok(CheckoutOutcome::PaymentRequired {
                    gateway_order_id: intent.id,
                    amount: intent.amount,
                    currency: intent.currency,
                })
            },
            other => Err(OrderFlowError::UnsupportedPaymentMethod(other.to_string())),
        }
    }

    /// Complete a gateway checkout. The client-supplied signature is recomputed server-side and
    /// compared in constant time *before* anything else happens; a mismatch creates no order.
    /// The cart is re-priced and must still total exactly what the intent was authorized for,
    /// so editing the cart between intent creation and verification cannot buy more than was paid.
    pub async fn verify_payment(
        &self,
        buyer_id: i64,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
    ) -> Result<OrderDetail, OrderFlowError> {
        if !verify_payment_signature(self.signature_secret.reveal(), gateway_order_id, gateway_payment_id, signature)
        {
            warn!("🔐️ Payment verification for intent {gateway_order_id} rejected: signature mismatch");
            return Err(OrderFlowError::InvalidPaymentSignature);
        }
        let intent = self.gateway.fetch_intent(gateway_order_id).await?;
        let intent_buyer = parse_note(&intent.notes, NOTE_BUYER_ID)?;
        let address_id = parse_note(&intent.notes, NOTE_ADDRESS_ID)?;
        if intent_buyer != buyer_id {
            warn!("🔐️ Intent {gateway_order_id} was created for buyer #{intent_buyer}, not #{buyer_id}");
            return Err(OrderFlowError::ForeignIntent);
        }
        // The cart may have changed since the intent was created, so re-validate everything and
        // make sure the payment still covers it
        let (lines, total, address) = self.checkout_context(buyer_id, address_id).await?;
        if total != intent.amount {
            warn!(
                "🔐️ Intent {gateway_order_id} was authorized for {}, but the cart now totals {total}",
                intent.amount
            );
            return Err(OrderFlowError::PaymentAmountMismatch { authorized: intent.amount, current: total });
        }
        let order = NewOrder {
            order_id: OrderId::random(),
            buyer_id,
            total,
            payment_method: GATEWAY_PAYMENT_METHOD.to_string(),
            payment_status: PaymentStatus::Paid,
            payment_txid: Some(gateway_payment_id.to_string()),
            address_id: Some(address.id),
        };
        self.persist_order(order, &lines, address).await
    }

    /// A buyer cancelling their own `Pending` order. Stock restoration happens in the same
    /// transaction as the status change.
    pub async fn cancel_order(&self, order_id: &OrderId, buyer_id: i64) -> Result<Order, OrderFlowError> {
        let order = self.db.cancel_order(order_id, buyer_id).await?;
        let items = self.db.fetch_order_items(order_id).await?;
        self.cache.delete(&keys::order_detail_key(order_id)).await;
        self.cache.bump(&keys::orders_scope(buyer_id)).await;
        self.cache.bump(&keys::products_scope()).await;
        for item in &items {
            self.cache.delete(&keys::product_detail_key(item.product_id)).await;
        }
        Ok(order)
    }

    pub async fn update_payment_status(
        &self,
        order_id: &OrderId,
        new_status: PaymentStatus,
        txid: Option<String>,
    ) -> Result<Order, OrderFlowError> {
        let order = self.db.update_payment_status(order_id, new_status, txid).await?;
        self.cache.delete(&keys::order_detail_key(order_id)).await;
        self.cache.bump(&keys::orders_scope(order.buyer_id)).await;
        Ok(order)
    }

    /// Fulfilment progression for artists/admins. Only the next step in the linear graph is
    /// accepted.
    pub async fn advance_order_status(
        &self,
        order_id: &OrderId,
        new_status: OrderStatus,
    ) -> Result<Order, OrderFlowError> {
        let order = self.db.advance_order_status(order_id, new_status).await?;
        self.cache.delete(&keys::order_detail_key(order_id)).await;
        self.cache.bump(&keys::orders_scope(order.buyer_id)).await;
        Ok(order)
    }

    /// One page of the buyer's orders, read through the cache and tagged with where it came from.
    pub async fn orders_for_buyer(
        &self,
        buyer_id: i64,
        status: Option<OrderStatus>,
        pagination: Pagination,
    ) -> Result<(Vec<Order>, CacheSource), OrderFlowError> {
        let scope = keys::orders_scope(buyer_id);
        let key = self.cache.scoped_key(&scope, &keys::orders_list_suffix(&pagination, status)).await;
        let db = self.db.clone();
        let filter = OrderQueryFilter { buyer_id: Some(buyer_id), status, pagination };
        let (orders, source) = self
            .cache
            .get_or_set(&key, DEFAULT_CACHE_TTL, || async move {
                db.search_orders(filter).await.map_err(OrderFlowError::from)
            })
            .await?;
        Ok((orders, source))
    }

    /// Fetch one order with its items, owner-scoped: an order belonging to someone else reads as
    /// not found.
    pub async fn order_by_id(
        &self,
        order_id: &OrderId,
        buyer_id: i64,
    ) -> Result<(OrderDetail, CacheSource), OrderFlowError> {
        let key = keys::order_detail_key(order_id);
        let db = self.db.clone();
        let id = order_id.clone();
        let (detail, source) = self
            .cache
            .get_or_set(&key, DEFAULT_CACHE_TTL, || async move {
                let order =
                    db.fetch_order(&id).await?.ok_or_else(|| OrderFlowError::OrderNotFound(id.clone()))?;
                let items = db.fetch_order_items(&id).await?;
                Ok::<_, OrderFlowError>(OrderDetail { order, items })
            })
            .await?;
        if detail.order.buyer_id != buyer_id {
            return Err(OrderFlowError::OrderNotFound(order_id.clone()));
        }
        Ok((detail, source))
    }

    /// Load and validate everything checkout needs: a non-empty cart, an address owned by the
    /// buyer, and live prices from the products table (never from the cache).
    async fn checkout_context(
        &self,
        buyer_id: i64,
        address_id: i64,
    ) -> Result<(Vec<PricedLine>, market_common::Money, Address), OrderFlowError> {
        let cart = self.db.fetch_cart(buyer_id).await?;
        if cart.is_empty() {
            return Err(OrderFlowError::EmptyCart);
        }
        let address = self
            .db
            .fetch_address_for_buyer(address_id, buyer_id)
            .await?
            .ok_or(OrderFlowError::AddressNotFound(address_id))?;
        let lines = cart.iter().map(PricedLine::from).collect::<Vec<_>>();
        let quote = pricing::quote(&lines);
        Ok((lines, quote.total, address))
    }

    /// The shared tail of both checkout paths: run the atomic insert, refresh caches, and fire
    /// the confirmation off the request path.
    async fn persist_order(
        &self,
        order: NewOrder,
        lines: &[PricedLine],
        address: Address,
    ) -> Result<OrderDetail, OrderFlowError> {
        let order = self.db.insert_full_order(order, lines).await?;
        let items = self.db.fetch_order_items(&order.order_id).await?;
        self.refresh_after_checkout(&order, lines).await;
        self.send_confirmation(&order, lines, address).await;
        debug!("🔄️ Order {} placed for buyer #{} ({})", order.order_id, order.buyer_id, order.payment_method);
        Ok(OrderDetail { order, items })
    }

    /// Cache maintenance after a committed checkout: drop the cart snapshot, invalidate every
    /// list view that could include the new order or the changed stock, and write the fresh first
    /// page of the buyer's order list through to the cache.
    async fn refresh_after_checkout(&self, order: &Order, lines: &[PricedLine]) {
        self.cache.delete(&keys::cart_key(order.buyer_id)).await;
        let scope = keys::orders_scope(order.buyer_id);
        self.cache.bump(&scope).await;
        self.cache.bump(&keys::products_scope()).await;
        for line in lines {
            self.cache.delete(&keys::product_detail_key(line.product_id)).await;
        }
        let pagination = Pagination::default();
        let filter = OrderQueryFilter { buyer_id: Some(order.buyer_id), status: None, pagination };
        match self.db.search_orders(filter).await {
            Ok(orders) => {
                let key = self.cache.scoped_key(&scope, &keys::orders_list_suffix(&pagination, None)).await;
                self.cache.set_json(&key, &orders, DEFAULT_CACHE_TTL).await;
            },
            Err(e) => warn!("🗄️ Could not refresh the order list for buyer #{}. {e}", order.buyer_id),
        }
    }

    async fn send_confirmation(&self, order: &Order, lines: &[PricedLine], address: Address) {
        let buyer = match self.db.fetch_user(order.buyer_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!("📧️ No user record for buyer #{}; skipping confirmation", order.buyer_id);
                return;
            },
            Err(e) => {
                warn!("📧️ Could not load buyer #{} for confirmation. {e}", order.buyer_id);
                return;
            },
        };
        let confirmation = OrderConfirmation {
            recipient_email: buyer.email,
            recipient_name: buyer.display_name,
            order_id: order.order_id.clone(),
            lines: lines
                .iter()
                .map(|l| ConfirmationLine { name: l.name.clone(), quantity: l.quantity, unit_price: l.unit_price })
                .collect(),
            total: order.total,
            shipping_address: Some(address),
            placed_at: order.created_at,
            payment_method: order.payment_method.clone(),
        };
        let notifier = Arc::clone(&self.notifier);
        let order_id = order.order_id.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.order_confirmation(confirmation).await {
                error!("📧️ Could not deliver confirmation for order {order_id}: {e}");
            }
        });
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

fn parse_note(notes: &HashMap<String, String>, key: &str) -> Result<i64, OrderFlowError> {
    notes.get(key).and_then(|v| v.parse().ok()).ok_or(OrderFlowError::IntentMissingContext)
}
