use axum::http::StatusCode;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::enrollment::Enrollment;
use crate::domain::payment::{err, internal, CreateOrderRequest, CreateOrderResponse, ErrorEnvelope};
use crate::gateways::{CheckoutGateway, CreateOrderParams};
use crate::repo::{CourseCatalog, EnrollmentLedger, NewPaymentRecord, PaymentStore};

#[derive(Clone)]
pub struct OrderService {
    pub catalog: Arc<dyn CourseCatalog>,
    pub ledger: Arc<dyn EnrollmentLedger>,
    pub payments: Arc<dyn PaymentStore>,
    pub gateway: Arc<dyn CheckoutGateway>,
    pub key_id: String,
    pub currency: String,
    pub min_order_amount: i64,
}

impl OrderService {
    pub async fn create_order(
        &self,
        user_id: Uuid,
        req: CreateOrderRequest,
    ) -> Result<CreateOrderResponse, (StatusCode, ErrorEnvelope)> {
        // The client-supplied amount is only screened against the floor; the
        // catalog price below is what actually gets charged.
        if req.amount < self.min_order_amount {
            return Err((
                StatusCode::BAD_REQUEST,
                err(
                    "INVALID_AMOUNT",
                    &format!("amount must be at least {}", self.min_order_amount),
                ),
            ));
        }

        let course = self
            .catalog
            .find_active(req.course_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| {
                (
                    StatusCode::NOT_FOUND,
                    err("COURSE_NOT_FOUND", "course does not exist or is not open for enrollment"),
                )
            })?;

        let existing = self
            .ledger
            .find_enrollment(user_id, course.course_id)
            .await
            .map_err(internal)?;
        if existing.as_ref().is_some_and(Enrollment::is_paid) {
            return Err((
                StatusCode::BAD_REQUEST,
                err("ALREADY_ENROLLED", "user is already enrolled in this course"),
            ));
        }

        let order = self
            .gateway
            .create_order(CreateOrderParams {
                amount_minor: course.price * 100,
                currency: self.currency.clone(),
                receipt: format!("c_{}", course.course_id.simple()),
                user_id,
                course_id: course.course_id,
            })
            .await
            .map_err(|e| {
                tracing::error!("gateway order create failed: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    err("GATEWAY_UNAVAILABLE", "could not create payment order"),
                )
            })?;

        self.payments
            .insert_pending(NewPaymentRecord {
                order_id: order.order_id.clone(),
                user_id,
                course_id: course.course_id,
                amount: course.price,
                currency: order.currency.clone(),
                gateway: self.gateway.name().to_string(),
            })
            .await
            .map_err(internal)?;

        tracing::info!(
            "order {} created for user {} course {}",
            order.order_id,
            user_id,
            course.course_id
        );

        Ok(CreateOrderResponse {
            order_id: order.order_id,
            amount: order.amount_minor,
            currency: order.currency,
            key_id: self.key_id.clone(),
            course,
        })
    }
}
