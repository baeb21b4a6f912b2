use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{ChatChannel, ChatMessage},
    error::{AppError, Result},
    repository::ChatRepository,
};

#[derive(FromRow)]
struct ChannelRow {
    id: String,
    booking_id: String,
    customer_id: String,
    artist_id: String,
    created_at: NaiveDateTime,
}

#[derive(FromRow)]
struct MessageRow {
    id: String,
    channel_id: String,
    sender_id: String,
    body: String,
    created_at: NaiveDateTime,
}

pub struct SqliteChatRepository {
    pool: SqlitePool,
}

impl SqliteChatRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_channel(row: ChannelRow) -> Result<ChatChannel> {
        Ok(ChatChannel {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            booking_id: Uuid::parse_str(&row.booking_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            customer_id: Uuid::parse_str(&row.customer_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            artist_id: Uuid::parse_str(&row.artist_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }

    fn row_to_message(row: MessageRow) -> Result<ChatMessage> {
        Ok(ChatMessage {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            channel_id: Uuid::parse_str(&row.channel_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            sender_id: Uuid::parse_str(&row.sender_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            body: row.body,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl ChatRepository for SqliteChatRepository {
    async fn create_channel(&self, channel: ChatChannel) -> Result<ChatChannel> {
        sqlx::query(
            r#"
            INSERT INTO chat_channels (id, booking_id, customer_id, artist_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(channel.id.to_string())
        .bind(channel.booking_id.to_string())
        .bind(channel.customer_id.to_string())
        .bind(channel.artist_id.to_string())
        .bind(channel.created_at.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("A chat channel already exists for this booking".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

        Ok(channel)
    }

    async fn find_channel_by_id(&self, id: Uuid) -> Result<Option<ChatChannel>> {
        let row = sqlx::query_as::<_, ChannelRow>(
            "SELECT id, booking_id, customer_id, artist_id, created_at FROM chat_channels WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_channel(r)?)),
            None => Ok(None),
        }
    }

    async fn find_channel_by_booking(&self, booking_id: Uuid) -> Result<Option<ChatChannel>> {
        let row = sqlx::query_as::<_, ChannelRow>(
            "SELECT id, booking_id, customer_id, artist_id, created_at FROM chat_channels WHERE booking_id = ?",
        )
        .bind(booking_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_channel(r)?)),
            None => Ok(None),
        }
    }

    async fn list_channels_for_user(&self, user_id: Uuid) -> Result<Vec<ChatChannel>> {
        let id = user_id.to_string();
        let rows = sqlx::query_as::<_, ChannelRow>(
            "SELECT id, booking_id, customer_id, artist_id, created_at FROM chat_channels \
             WHERE customer_id = ? OR artist_id = ? ORDER BY created_at DESC",
        )
        .bind(&id)
        .bind(&id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_channel).collect()
    }

    async fn add_message(&self, message: ChatMessage) -> Result<ChatMessage> {
        sqlx::query(
            "INSERT INTO chat_messages (id, channel_id, sender_id, body, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(message.id.to_string())
        .bind(message.channel_id.to_string())
        .bind(message.sender_id.to_string())
        .bind(&message.body)
        .bind(message.created_at.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(message)
    }

    async fn list_messages(&self, channel_id: Uuid, limit: i64, offset: i64) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, channel_id, sender_id, body, created_at FROM chat_messages \
             WHERE channel_id = ? ORDER BY created_at ASC LIMIT ? OFFSET ?",
        )
        .bind(channel_id.to_string())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_message).collect()
    }
}
