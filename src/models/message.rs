use anyhow::{ensure, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::models::Conversation;

/// Append-only text message scoped to a conversation.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Appends a message. The sender must be one of the conversation's two
    /// participants.
    pub async fn append(
        pool: &SqlitePool,
        conversation: &Conversation,
        sender_id: &str,
        text: &str,
    ) -> Result<Self> {
        ensure!(
            conversation.includes(sender_id),
            "sender is not a participant of this conversation"
        );

        let message = Message {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation.id.clone(),
            sender_id: sender_id.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, sender_id, text, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&message.id)
        .bind(&message.conversation_id)
        .bind(&message.sender_id)
        .bind(&message.text)
        .bind(message.created_at)
        .execute(pool)
        .await?;

        Ok(message)
    }

    /// All messages of a conversation, oldest first. Unbounded; clients poll
    /// the full log.
    pub async fn list(pool: &SqlitePool, conversation_id: &str) -> Result<Vec<Self>> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE conversation_id = ? ORDER BY created_at ASC",
        )
        .bind(conversation_id)
        .fetch_all(pool)
        .await?;
        Ok(messages)
    }

    /// Newest message, used as the thread-list preview.
    pub async fn last(pool: &SqlitePool, conversation_id: &str) -> Result<Option<Self>> {
        let message = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE conversation_id = ? ORDER BY created_at DESC LIMIT 1",
        )
        .bind(conversation_id)
        .fetch_optional(pool)
        .await?;
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::Message;
    use crate::models::user::{hash_password, Role, User};
    use crate::models::Conversation;
    use crate::MIGRATOR;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    async fn setup() -> (SqlitePool, User, User, Conversation) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        MIGRATOR.run(&pool).await.unwrap();

        let hash = hash_password("password123").unwrap();
        let student = User::create(&pool, "S", "s@gmail.com", "S-1", &hash, Role::Student)
            .await
            .unwrap();
        let counsellor = User::create(&pool, "C", "c@gmail.com", "EMP-1", &hash, Role::Counsellor)
            .await
            .unwrap();
        let conversation = Conversation::get_or_create(&pool, &student.id, &counsellor.id)
            .await
            .unwrap();
        (pool, student, counsellor, conversation)
    }

    #[tokio::test]
    async fn non_participant_append_is_rejected() {
        let (pool, _student, _counsellor, conversation) = setup().await;
        let result = Message::append(&pool, &conversation, "intruder", "hi").await;
        assert!(result.is_err());
        assert!(Message::list(&pool, &conversation.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn list_is_ordered_oldest_first() {
        let (pool, student, counsellor, conversation) = setup().await;
        Message::append(&pool, &conversation, &student.id, "first")
            .await
            .unwrap();
        Message::append(&pool, &conversation, &counsellor.id, "second")
            .await
            .unwrap();
        Message::append(&pool, &conversation, &student.id, "third")
            .await
            .unwrap();

        let messages = Message::list(&pool, &conversation.id).await.unwrap();
        let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert!(messages.windows(2).all(|w| w[0].created_at <= w[1].created_at));

        let last = Message::last(&pool, &conversation.id).await.unwrap().unwrap();
        assert_eq!(last.text, "third");
    }
}
