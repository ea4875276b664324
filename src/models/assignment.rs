use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::models::User;

/// Durable mapping of one student to one counsellor.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub student_id: String,
    pub counsellor_id: String,
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    pub async fn find_for_student(pool: &SqlitePool, student_id: &str) -> Result<Option<Self>> {
        let assignment =
            sqlx::query_as::<_, Assignment>("SELECT * FROM assignments WHERE student_id = ?")
                .bind(student_id)
                .fetch_optional(pool)
                .await?;
        Ok(assignment)
    }

    pub async fn list_for_counsellor(pool: &SqlitePool, counsellor_id: &str) -> Result<Vec<Self>> {
        let assignments = sqlx::query_as::<_, Assignment>(
            "SELECT * FROM assignments WHERE counsellor_id = ? ORDER BY created_at ASC",
        )
        .bind(counsellor_id)
        .fetch_all(pool)
        .await?;
        Ok(assignments)
    }

    /// Returns the student's counsellor mapping, creating one on demand with
    /// a uniformly random counsellor. The UNIQUE key on student_id makes the
    /// insert idempotent: a conflict means another request created the
    /// mapping first, so we re-read instead of failing. No counsellors on
    /// record yields `None`.
    pub async fn resolve_for_student(pool: &SqlitePool, student_id: &str) -> Result<Option<Self>> {
        if let Some(assignment) = Self::find_for_student(pool, student_id).await? {
            return Ok(Some(assignment));
        }

        let counsellors = User::counsellor_ids(pool).await?;
        let Some(counsellor_id) = counsellors.choose(&mut rand::thread_rng()).cloned() else {
            return Ok(None);
        };

        sqlx::query(
            r#"
            INSERT INTO assignments (id, student_id, counsellor_id, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(student_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(student_id)
        .bind(&counsellor_id)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        debug!("Assigned student {} a counsellor", student_id);
        Self::find_for_student(pool, student_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::Assignment;
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
    async fn resolve_without_counsellors_is_empty() {
        let pool = pool().await;
        let hash = hash_password("password123").unwrap();
        let student = User::create(
            &pool,
            "Student",
            "student@gmail.com",
            "S-1",
            &hash,
            Role::Student,
        )
        .await
        .unwrap();

        let resolved = Assignment::resolve_for_student(&pool, &student.id)
            .await
            .unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn resolve_is_stable_across_calls() {
        let pool = pool().await;
        let hash = hash_password("password123").unwrap();
        for i in 0..3 {
            User::create(
                &pool,
                "Counsellor",
                &format!("counsellor{i}@gmail.com"),
                &format!("EMP-{i}"),
                &hash,
                Role::Counsellor,
            )
            .await
            .unwrap();
        }
        let student = User::create(
            &pool,
            "Student",
            "student@gmail.com",
            "S-1",
            &hash,
            Role::Student,
        )
        .await
        .unwrap();

        let first = Assignment::resolve_for_student(&pool, &student.id)
            .await
            .unwrap()
            .unwrap();
        let second = Assignment::resolve_for_student(&pool, &student.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.counsellor_id, second.counsellor_id);
        assert_eq!(first.id, second.id);
    }
}
