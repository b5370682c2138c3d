use axum::http::StatusCode;
use std::sync::Arc;

use crate::domain::payment::{err, ErrorEnvelope};
use crate::domain::webhook::{WebhookEvent, WebhookPayment};
use crate::repo::PaymentStore;
use crate::signature;

#[derive(Clone)]
pub struct WebhookService {
    pub payments: Arc<dyn PaymentStore>,
    pub webhook_secret: String,
}

impl WebhookService {
    /// Reconciles a gateway-pushed event against the payment store. Once
    /// the signature is valid the gateway always gets a 200; failures past
    /// that point are logged and swallowed.
    pub async fn handle(
        &self,
        raw_body: &[u8],
        signature_header: Option<&str>,
    ) -> Result<(), (StatusCode, ErrorEnvelope)> {
        if self.webhook_secret.is_empty() {
            return Err((
                StatusCode::BAD_REQUEST,
                err("INVALID_WEBHOOK_SIGNATURE", "webhook secret is not configured"),
            ));
        }

        let Some(provided) = signature_header else {
            return Err((
                StatusCode::BAD_REQUEST,
                err("INVALID_WEBHOOK_SIGNATURE", "signature header is missing"),
            ));
        };

        if !signature::verify_webhook_signature(&self.webhook_secret, raw_body, provided) {
            tracing::warn!("webhook signature mismatch, body ignored");
            return Err((
                StatusCode::BAD_REQUEST,
                err(
                    "INVALID_WEBHOOK_SIGNATURE",
                    "webhook signature verification failed",
                ),
            ));
        }

        let event = match WebhookEvent::parse(raw_body) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("acknowledged undecodable webhook body: {:#}", e);
                return Ok(());
            }
        };

        match event {
            WebhookEvent::PaymentCaptured(payment) => self.reconcile_captured(payment).await,
            WebhookEvent::PaymentFailed(payment) => self.reconcile_failed(payment).await,
            WebhookEvent::Unknown(name) => {
                tracing::info!("acknowledged unhandled webhook event {}", name);
            }
        }

        Ok(())
    }

    // Flips the record only; enrollment stays with the verify path. A user
    // who pays but never returns to the client keeps a completed record and
    // no enrollment (see DESIGN.md).
    async fn reconcile_captured(&self, payment: WebhookPayment) {
        match self.payments.find_by_order_id(&payment.order_id).await {
            Ok(Some(_)) => {
                match self
                    .payments
                    .mark_captured(&payment.order_id, &payment.id, payment.method.as_deref())
                    .await
                {
                    Ok(true) => {
                        tracing::info!(
                            "webhook capture completed order {} with payment {}",
                            payment.order_id,
                            payment.id
                        );
                    }
                    Ok(false) => {
                        tracing::info!(
                            "webhook capture for order {} ignored, record already settled",
                            payment.order_id
                        );
                    }
                    Err(e) => {
                        tracing::error!(
                            "webhook capture update failed for order {}: {:#}",
                            payment.order_id,
                            e
                        );
                    }
                }
            }
            Ok(None) => {
                tracing::warn!(
                    "webhook capture for unknown order {} acknowledged",
                    payment.order_id
                );
            }
            Err(e) => {
                tracing::error!(
                    "webhook capture lookup failed for order {}: {:#}",
                    payment.order_id,
                    e
                );
            }
        }
    }

    async fn reconcile_failed(&self, payment: WebhookPayment) {
        match self.payments.mark_failed(&payment.order_id).await {
            Ok(true) => {
                tracing::info!("webhook marked order {} failed", payment.order_id);
            }
            Ok(false) => {
                tracing::info!(
                    "webhook failure for order {} ignored, record not pending",
                    payment.order_id
                );
            }
            Err(e) => {
                tracing::error!(
                    "webhook failure update failed for order {}: {:#}",
                    payment.order_id,
                    e
                );
            }
        }
    }
}
