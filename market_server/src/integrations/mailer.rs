//! Confirmation delivery that writes to the log instead of an SMTP relay. Stands in until a real
//! mail provider is wired up; the order flow only sees the [`OrderNotifier`] trait either way.

use async_trait::async_trait;
use log::info;
use market_engine::traits::{NotifyError, OrderConfirmation, OrderNotifier};

#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl OrderNotifier for LogMailer {
    async fn order_confirmation(&self, confirmation: OrderConfirmation) -> Result<(), NotifyError> {
        let lines = confirmation
            .lines
            .iter()
            .map(|l| format!("{} x {} @ {}", l.quantity, l.name, l.unit_price))
            .collect::<Vec<_>>()
            .join("; ");
        info!(
            "📧️ Order confirmation for {} <{}>: order {}, total {} via {}. Items: {lines}",
            confirmation.recipient_name,
            confirmation.recipient_email,
            confirmation.order_id,
            confirmation.total,
            confirmation.payment_method,
        );
        Ok(())
    }
}
