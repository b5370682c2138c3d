use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::enrollment::Enrollment;
use crate::repo::EnrollmentLedger;

#[derive(Clone)]
pub struct EnrollmentsRepo {
    pub pool: PgPool,
}

#[async_trait::async_trait]
impl EnrollmentLedger for EnrollmentsRepo {
    async fn find_enrollment(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>> {
        let row = sqlx::query(
            "SELECT course_id, payment_id, enrolled_at FROM enrollments WHERE user_id = $1 AND course_id = $2",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Enrollment {
            course_id: row.get("course_id"),
            payment_id: row.get("payment_id"),
            enrolled_at: row.get("enrolled_at"),
        }))
    }
}
