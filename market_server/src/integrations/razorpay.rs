//! The engine's [`PaymentGateway`] implemented over the Razorpay REST client.

use async_trait::async_trait;
use market_common::Money;
use market_engine::traits::{NewPaymentIntent, PaymentGateway, PaymentGatewayError, PaymentIntent};
use razorpay_tools::{NewRazorpayOrder, RazorpayApi, RazorpayApiError, RazorpayOrder};

pub struct RazorpayGateway {
    api: RazorpayApi,
}

impl RazorpayGateway {
    pub fn new(api: RazorpayApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_intent(&self, intent: NewPaymentIntent) -> Result<PaymentIntent, PaymentGatewayError> {
        let order = NewRazorpayOrder {
            amount: intent.amount.value(),
            currency: intent.currency,
            receipt: intent.receipt,
            notes: intent.notes,
        };
        let order = self.api.create_order(order).await.map_err(convert_error)?;
        Ok(to_intent(order))
    }

    async fn fetch_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentGatewayError> {
        let order = self.api.get_order(intent_id).await.map_err(|e| {
            if e.is_not_found() {
                PaymentGatewayError::IntentNotFound(intent_id.to_string())
            } else {
                convert_error(e)
            }
        })?;
        Ok(to_intent(order))
    }
}

fn to_intent(order: RazorpayOrder) -> PaymentIntent {
    PaymentIntent {
        id: order.id,
        amount: Money::from_minor(order.amount),
        currency: order.currency,
        receipt: order.receipt.unwrap_or_default(),
        notes: order.notes,
        status: order.status,
    }
}

fn convert_error(e: RazorpayApiError) -> PaymentGatewayError {
    match e {
        RazorpayApiError::RestResponseError(m) => PaymentGatewayError::Unreachable(m),
        other => PaymentGatewayError::InvalidResponse(other.to_string()),
    }
}
