use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: String,
    #[serde(skip_serializing)]
    pub user_id: String,
    pub action: String,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActivityEntry {
    /// Best-effort audit record: a failed write is logged and absorbed so it
    /// never fails the operation being recorded.
    pub async fn record(
        pool: &SqlitePool,
        user_id: &str,
        action: &str,
        details: Option<serde_json::Value>,
    ) {
        if let Err(e) = Self::try_record(pool, user_id, action, details).await {
            warn!("Failed to record activity {}: {:?}", action, e);
        }
    }

    async fn try_record(
        pool: &SqlitePool,
        user_id: &str,
        action: &str,
        details: Option<serde_json::Value>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO activity_log (id, user_id, action, details, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(action)
        .bind(details.map(|d| d.to_string()))
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Most recent entries for a user, newest first, capped at 50.
    pub async fn recent(pool: &SqlitePool, user_id: &str) -> Result<Vec<Self>> {
        let entries = sqlx::query_as::<_, ActivityEntry>(
            "SELECT * FROM activity_log WHERE user_id = ? ORDER BY created_at DESC LIMIT 50",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(entries)
    }
}
