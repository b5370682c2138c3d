use anyhow::{Context, Result};
use serde::Deserialize;

/// Gateway-pushed payment lifecycle events, decoded from the raw webhook
/// body. Events this service does not understand are preserved by name so
/// the reconciler can acknowledge them without acting.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    PaymentCaptured(WebhookPayment),
    PaymentFailed(WebhookPayment),
    Unknown(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayment {
    pub id: String,
    pub order_id: String,
    pub amount: i64,
    pub method: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    event: String,
    payload: Option<RawPayload>,
}

#[derive(Debug, Deserialize)]
struct RawPayload {
    payment: Option<RawPaymentWrapper>,
}

#[derive(Debug, Deserialize)]
struct RawPaymentWrapper {
    entity: WebhookPayment,
}

impl WebhookEvent {
    pub fn parse(raw_body: &[u8]) -> Result<WebhookEvent> {
        let raw: RawEvent =
            serde_json::from_slice(raw_body).context("webhook body is not valid JSON")?;

        match raw.event.as_str() {
            "payment.captured" => Ok(WebhookEvent::PaymentCaptured(payment_entity(raw)?)),
            "payment.failed" => Ok(WebhookEvent::PaymentFailed(payment_entity(raw)?)),
            _ => Ok(WebhookEvent::Unknown(raw.event)),
        }
    }
}

fn payment_entity(raw: RawEvent) -> Result<WebhookPayment> {
    raw.payload
        .and_then(|p| p.payment)
        .map(|w| w.entity)
        .with_context(|| format!("{} event is missing the payment entity", raw.event))
}
