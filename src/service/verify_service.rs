use axum::http::StatusCode;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::enrollment::Enrollment;
use crate::domain::payment::{
    err, err_with, internal, ErrorEnvelope, PaymentStatus, VerifyRequest, VerifyResponse,
};
use crate::gateways::CheckoutGateway;
use crate::repo::{CommitOutcome, CompletedCheckout, EnrollmentLedger, PaymentStore};
use crate::signature;

#[derive(Clone)]
pub struct VerifyService {
    pub payments: Arc<dyn PaymentStore>,
    pub ledger: Arc<dyn EnrollmentLedger>,
    pub gateway: Arc<dyn CheckoutGateway>,
    pub key_secret: String,
}

impl VerifyService {
    /// Turns a client-reported payment into an enrollment, at most once.
    /// Checks short-circuit; nothing is written until the final conditional
    /// commit.
    pub async fn verify(
        &self,
        user_id: Uuid,
        req: VerifyRequest,
    ) -> Result<VerifyResponse, (StatusCode, ErrorEnvelope)> {
        let (Some(payment_id), Some(order_id), Some(provided_signature), Some(course_id)) = (
            req.razorpay_payment_id,
            req.razorpay_order_id,
            req.razorpay_signature,
            req.course_id,
        ) else {
            return Err(missing_parameters());
        };
        if payment_id.is_empty() || order_id.is_empty() || provided_signature.is_empty() {
            return Err(missing_parameters());
        }

        if !signature::verify_payment_signature(
            &self.key_secret,
            &order_id,
            &payment_id,
            &provided_signature,
        ) {
            tracing::warn!(
                "signature mismatch for order {} payment {}",
                order_id,
                payment_id
            );
            return Err((
                StatusCode::BAD_REQUEST,
                err("INVALID_SIGNATURE", "payment signature verification failed"),
            ));
        }

        let fetched = self.gateway.fetch_payment(&payment_id).await.map_err(|e| {
            tracing::error!("gateway payment fetch failed for {}: {:#}", payment_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                err(
                    "GATEWAY_VERIFICATION_FAILED",
                    "could not confirm payment with the gateway",
                ),
            )
        })?;

        if fetched.status != "captured" && fetched.status != "authorized" {
            return Err((
                StatusCode::BAD_REQUEST,
                err_with(
                    "PAYMENT_NOT_SUCCESSFUL",
                    "payment was not successful",
                    format!("gateway reported status {}", fetched.status),
                ),
            ));
        }

        let record = self
            .payments
            .find_by_order(&order_id, user_id)
            .await
            .map_err(internal)?
            .filter(|record| record.course_id == course_id)
            .ok_or_else(|| {
                (
                    StatusCode::NOT_FOUND,
                    err(
                        "PAYMENT_RECORD_NOT_FOUND",
                        "no checkout attempt found for this order",
                    ),
                )
            })?;

        // The gateway reports minor units; the record stores the catalog
        // price in major units.
        if fetched.amount_minor != record.amount * 100 {
            tracing::warn!(
                "amount mismatch for order {}: expected {} minor units, gateway reported {}",
                order_id,
                record.amount * 100,
                fetched.amount_minor
            );
            return Err((
                StatusCode::BAD_REQUEST,
                err(
                    "AMOUNT_MISMATCH",
                    "captured amount does not match the order amount",
                ),
            ));
        }

        if record.status == PaymentStatus::Completed {
            return Err(already_processed());
        }

        let existing = self
            .ledger
            .find_enrollment(user_id, course_id)
            .await
            .map_err(internal)?;
        if existing.as_ref().is_some_and(Enrollment::is_paid) {
            return Err(already_enrolled());
        }

        let outcome = self
            .payments
            .complete_checkout(CompletedCheckout {
                order_id: order_id.clone(),
                user_id,
                course_id,
                payment_id: payment_id.clone(),
                signature: provided_signature,
                payment_method: fetched.method.clone(),
            })
            .await
            .map_err(internal)?;

        match outcome {
            CommitOutcome::Enrolled => {
                tracing::info!(
                    "payment {} verified, user {} enrolled in course {}",
                    payment_id,
                    user_id,
                    course_id
                );
                Ok(VerifyResponse {
                    payment_id,
                    course_id,
                    amount: record.amount,
                    method: fetched.method,
                })
            }
            CommitOutcome::AlreadyCompleted => Err(already_processed()),
            CommitOutcome::AlreadyEnrolled => Err(already_enrolled()),
        }
    }
}

fn missing_parameters() -> (StatusCode, ErrorEnvelope) {
    (
        StatusCode::BAD_REQUEST,
        err(
            "MISSING_PARAMETERS",
            "payment id, order id, signature and course id are all required",
        ),
    )
}

fn already_processed() -> (StatusCode, ErrorEnvelope) {
    (
        StatusCode::BAD_REQUEST,
        err("ALREADY_PROCESSED", "payment has already been processed"),
    )
}

fn already_enrolled() -> (StatusCode, ErrorEnvelope) {
    (
        StatusCode::BAD_REQUEST,
        err("ALREADY_ENROLLED", "user is already enrolled in this course"),
    )
}
