use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use uuid::Uuid;

/// Durable mapping of one (student, counsellor) pair to a message thread.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub student_id: String,
    pub counsellor_id: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Self>> {
        let conversation =
            sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = ?")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(conversation)
    }

    /// Lazily provisions the conversation for a pair. The UNIQUE key on
    /// (student_id, counsellor_id) turns concurrent first accesses into a
    /// conflict-then-reread rather than duplicate rows.
    pub async fn get_or_create(
        pool: &SqlitePool,
        student_id: &str,
        counsellor_id: &str,
    ) -> Result<Self> {
        sqlx::query(
            r#"
            INSERT INTO conversations (id, student_id, counsellor_id, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(student_id, counsellor_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(student_id)
        .bind(counsellor_id)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        let conversation = sqlx::query_as::<_, Conversation>(
            "SELECT * FROM conversations WHERE student_id = ? AND counsellor_id = ?",
        )
        .bind(student_id)
        .bind(counsellor_id)
        .fetch_one(pool)
        .await?;

        debug!("Conversation ready: {}", conversation.id);
        Ok(conversation)
    }

    pub fn includes(&self, user_id: &str) -> bool {
        self.student_id == user_id || self.counsellor_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::Conversation;
    use crate::models::user::{hash_password, Role, User};
    use crate::MIGRATOR;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    async fn pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        MIGRATOR.run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let pool = pool().await;
        let hash = hash_password("password123").unwrap();
        let student = User::create(&pool, "S", "s@gmail.com", "S-1", &hash, Role::Student)
            .await
            .unwrap();
        let counsellor = User::create(&pool, "C", "c@gmail.com", "EMP-1", &hash, Role::Counsellor)
            .await
            .unwrap();

        let first = Conversation::get_or_create(&pool, &student.id, &counsellor.id)
            .await
            .unwrap();
        let second = Conversation::get_or_create(&pool, &student.id, &counsellor.id)
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert!(first.includes(&student.id));
        assert!(first.includes(&counsellor.id));
        assert!(!first.includes("someone-else"));
    }
}
