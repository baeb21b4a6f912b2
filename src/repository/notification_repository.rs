use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Notification, NotificationKind},
    error::{AppError, Result},
    repository::NotificationRepository,
};

#[derive(FromRow)]
struct NotificationRow {
    id: String,
    user_id: String,
    kind: String,
    title: String,
    body: String,
    is_read: i64,
    related_id: Option<String>,
    created_at: NaiveDateTime,
}

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, kind, title, body, is_read, related_id, created_at";

pub struct SqliteNotificationRepository {
    pool: SqlitePool,
}

impl SqliteNotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_kind(s: &str) -> Result<NotificationKind> {
        match s {
            "BookingRequest" => Ok(NotificationKind::BookingRequest),
            "BookingStatus" => Ok(NotificationKind::BookingStatus),
            "PaymentReceived" => Ok(NotificationKind::PaymentReceived),
            "PaymentRefunded" => Ok(NotificationKind::PaymentRefunded),
            "ReviewReceived" => Ok(NotificationKind::ReviewReceived),
            "ArtistApplication" => Ok(NotificationKind::ArtistApplication),
            "Dispute" => Ok(NotificationKind::Dispute),
            "System" => Ok(NotificationKind::System),
            _ => Err(AppError::Database(format!("Invalid notification kind: {}", s))),
        }
    }

    fn row_to_notification(row: NotificationRow) -> Result<Notification> {
        Ok(Notification {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            kind: Self::parse_kind(&row.kind)?,
            title: row.title,
            body: row.body,
            is_read: row.is_read != 0,
            related_id: row
                .related_id
                .as_deref()
                .map(Uuid::parse_str)
                .transpose()
                .map_err(|e| AppError::Database(e.to_string()))?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl NotificationRepository for SqliteNotificationRepository {
    async fn create(&self, notification: Notification) -> Result<Notification> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, body, is_read, related_id, created_at)
            VALUES (?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(notification.id.to_string())
        .bind(notification.user_id.to_string())
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.related_id.map(|id| id.to_string()))
        .bind(notification.created_at.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(notification)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>> {
        let sql = if unread_only {
            format!(
                "SELECT {} FROM notifications WHERE user_id = ? AND is_read = 0 \
                 ORDER BY created_at DESC LIMIT ? OFFSET ?",
                NOTIFICATION_COLUMNS
            )
        } else {
            format!(
                "SELECT {} FROM notifications WHERE user_id = ? \
                 ORDER BY created_at DESC LIMIT ? OFFSET ?",
                NOTIFICATION_COLUMNS
            )
        };

        let rows = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(user_id.to_string())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_notification).collect()
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<Notification> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }

        let sql = format!("SELECT {} FROM notifications WHERE id = ?", NOTIFICATION_COLUMNS);
        let row = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Self::row_to_notification(row)
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0",
        )
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
