use anyhow::Result;
use uuid::Uuid;

use crate::domain::enrollment::{CourseListing, Enrollment};
use crate::domain::payment::PaymentRecord;

pub mod courses_repo;
pub mod enrollments_repo;
pub mod payments_repo;

#[derive(Debug, Clone)]
pub struct NewPaymentRecord {
    pub order_id: String,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub gateway: String,
}

#[derive(Debug, Clone)]
pub struct CompletedCheckout {
    pub order_id: String,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub payment_id: String,
    pub signature: String,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Enrolled,
    AlreadyCompleted,
    AlreadyEnrolled,
}

/// Durable record of checkout attempts. The verify path and the webhook
/// path are unordered writers to the same record, so every status
/// transition is a conditional write on the current status.
#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert_pending(&self, record: NewPaymentRecord) -> Result<()>;

    async fn find_by_order(&self, order_id: &str, user_id: Uuid) -> Result<Option<PaymentRecord>>;

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<PaymentRecord>>;

    /// The unit of atomicity for a successful verification: flip the record
    /// to completed, append the enrollment, bump the course counter. All
    /// three apply or none do.
    async fn complete_checkout(&self, checkout: CompletedCheckout) -> Result<CommitOutcome>;

    /// Webhook transition `pending -> completed`. Returns false when the
    /// record was no longer pending.
    async fn mark_captured(
        &self,
        order_id: &str,
        payment_id: &str,
        method: Option<&str>,
    ) -> Result<bool>;

    /// Webhook transition `pending -> failed`. Never overwrites a completed
    /// record.
    async fn mark_failed(&self, order_id: &str) -> Result<bool>;

    async fn history(&self, user_id: Uuid, limit: i64, offset: i64) -> Result<Vec<PaymentRecord>>;
}

#[async_trait::async_trait]
pub trait EnrollmentLedger: Send + Sync {
    async fn find_enrollment(&self, user_id: Uuid, course_id: Uuid)
        -> Result<Option<Enrollment>>;
}

#[async_trait::async_trait]
pub trait CourseCatalog: Send + Sync {
    async fn find_active(&self, course_id: Uuid) -> Result<Option<CourseListing>>;
}
