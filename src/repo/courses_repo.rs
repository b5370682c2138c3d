use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::enrollment::CourseListing;
use crate::repo::CourseCatalog;

#[derive(Clone)]
pub struct CoursesRepo {
    pub pool: PgPool,
}

#[async_trait::async_trait]
impl CourseCatalog for CoursesRepo {
    async fn find_active(&self, course_id: Uuid) -> Result<Option<CourseListing>> {
        let row = sqlx::query(
            "SELECT course_id, title, price FROM courses WHERE course_id = $1 AND is_active = true",
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| CourseListing {
            course_id: row.get("course_id"),
            title: row.get("title"),
            price: row.get("price"),
        }))
    }
}
