use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::payment::{PaymentRecord, PaymentStatus};
use crate::repo::{CommitOutcome, CompletedCheckout, NewPaymentRecord, PaymentStore};

#[derive(Clone)]
pub struct PaymentsRepo {
    pub pool: PgPool,
}

const RECORD_COLUMNS: &str = "order_id, payment_id, user_id, course_id, amount, currency, gateway, status, payment_method, created_at, payment_date";

fn record_from_row(row: &PgRow) -> PaymentRecord {
    PaymentRecord {
        order_id: row.get("order_id"),
        payment_id: row.get("payment_id"),
        user_id: row.get("user_id"),
        course_id: row.get("course_id"),
        amount: row.get("amount"),
        currency: row.get("currency"),
        gateway: row.get("gateway"),
        status: PaymentStatus::parse(row.get::<String, _>("status").as_str()),
        payment_method: row.get("payment_method"),
        created_at: row.get("created_at"),
        payment_date: row.get("payment_date"),
    }
}

#[async_trait::async_trait]
impl PaymentStore for PaymentsRepo {
    async fn insert_pending(&self, record: NewPaymentRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (order_id, user_id, course_id, amount, currency, gateway, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&record.order_id)
        .bind(record.user_id)
        .bind(record.course_id)
        .bind(record.amount)
        .bind(&record.currency)
        .bind(&record.gateway)
        .bind(PaymentStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_order(&self, order_id: &str, user_id: Uuid) -> Result<Option<PaymentRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM payments WHERE order_id = $1 AND user_id = $2"
        ))
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(record_from_row))
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<PaymentRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM payments WHERE order_id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(record_from_row))
    }

    async fn complete_checkout(&self, checkout: CompletedCheckout) -> Result<CommitOutcome> {
        let mut tx = self.pool.begin().await?;

        let flipped = sqlx::query(
            r#"
            UPDATE payments
            SET status = 'completed', payment_id = $3, signature = $4,
                payment_method = $5, payment_date = now()
            WHERE order_id = $1 AND user_id = $2
              AND status NOT IN ('completed', 'refunded')
            "#,
        )
        .bind(&checkout.order_id)
        .bind(checkout.user_id)
        .bind(&checkout.payment_id)
        .bind(&checkout.signature)
        .bind(&checkout.payment_method)
        .execute(tx.as_mut())
        .await?
        .rows_affected();

        if flipped == 0 {
            tx.rollback().await?;
            return Ok(CommitOutcome::AlreadyCompleted);
        }

        let enrolled = sqlx::query(
            r#"
            INSERT INTO enrollments (user_id, course_id, payment_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, course_id) DO NOTHING
            "#,
        )
        .bind(checkout.user_id)
        .bind(checkout.course_id)
        .bind(&checkout.payment_id)
        .execute(tx.as_mut())
        .await?
        .rows_affected();

        if enrolled == 0 {
            tx.rollback().await?;
            return Ok(CommitOutcome::AlreadyEnrolled);
        }

        sqlx::query("UPDATE courses SET enrolled_count = enrolled_count + 1 WHERE course_id = $1")
            .bind(checkout.course_id)
            .execute(tx.as_mut())
            .await?;

        tx.commit().await?;
        Ok(CommitOutcome::Enrolled)
    }

    async fn mark_captured(
        &self,
        order_id: &str,
        payment_id: &str,
        method: Option<&str>,
    ) -> Result<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE payments
            SET status = 'completed', payment_id = $2, payment_method = $3, payment_date = now()
            WHERE order_id = $1 AND status = 'pending'
            "#,
        )
        .bind(order_id)
        .bind(payment_id)
        .bind(method)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn mark_failed(&self, order_id: &str) -> Result<bool> {
        let updated =
            sqlx::query("UPDATE payments SET status = 'failed' WHERE order_id = $1 AND status = 'pending'")
                .bind(order_id)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(updated > 0)
    }

    async fn history(&self, user_id: Uuid, limit: i64, offset: i64) -> Result<Vec<PaymentRecord>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {RECORD_COLUMNS} FROM payments
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(record_from_row).collect())
    }
}
