use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct CourseListing {
    pub course_id: Uuid,
    pub title: String,
    pub price: i64,
}

/// A ledger entry. An entry only grants access when it carries the payment
/// that authorized it.
#[derive(Debug, Clone)]
pub struct Enrollment {
    pub course_id: Uuid,
    pub payment_id: String,
    pub enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn is_paid(&self) -> bool {
        !self.payment_id.is_empty()
    }
}
