use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{ArtistApplication, PendingArtist, PendingArtistStatus},
    error::{AppError, Result},
    repository::PendingArtistRepository,
};

#[derive(FromRow)]
struct PendingArtistRow {
    id: String,
    email: String,
    name: String,
    phone: Option<String>,
    category_id: Option<String>,
    bio: Option<String>,
    hourly_rate_cents: i64,
    status: String,
    reviewed_by: Option<String>,
    reviewed_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const PENDING_COLUMNS: &str = "id, email, name, phone, category_id, bio, hourly_rate_cents, \
     status, reviewed_by, reviewed_at, created_at, updated_at";

pub struct SqlitePendingArtistRepository {
    pool: SqlitePool,
}

impl SqlitePendingArtistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_pending(row: PendingArtistRow) -> Result<PendingArtist> {
        Ok(PendingArtist {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            email: row.email,
            name: row.name,
            phone: row.phone,
            category_id: row
                .category_id
                .as_deref()
                .map(Uuid::parse_str)
                .transpose()
                .map_err(|e| AppError::Database(e.to_string()))?,
            bio: row.bio,
            hourly_rate_cents: row.hourly_rate_cents,
            status: match row.status.as_str() {
                "Pending" => PendingArtistStatus::Pending,
                "Approved" => PendingArtistStatus::Approved,
                "Rejected" => PendingArtistStatus::Rejected,
                other => {
                    return Err(AppError::Database(format!(
                        "Invalid pending artist status: {}",
                        other
                    )))
                }
            },
            reviewed_by: row
                .reviewed_by
                .as_deref()
                .map(Uuid::parse_str)
                .transpose()
                .map_err(|e| AppError::Database(e.to_string()))?,
            reviewed_at: row
                .reviewed_at
                .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc)),
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl PendingArtistRepository for SqlitePendingArtistRepository {
    async fn create(&self, application: ArtistApplication) -> Result<PendingArtist> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO pending_artists (
                id, email, name, phone, category_id, bio, hourly_rate_cents,
                status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, 'Pending', ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&application.email)
        .bind(&application.name)
        .bind(&application.phone)
        .bind(application.category_id.map(|c| c.to_string()))
        .bind(&application.bio)
        .bind(application.hourly_rate_cents)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("An application with this email already exists".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created application".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PendingArtist>> {
        let sql = format!("SELECT {} FROM pending_artists WHERE id = ?", PENDING_COLUMNS);
        let row = sqlx::query_as::<_, PendingArtistRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_pending(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<PendingArtist>> {
        let sql = format!("SELECT {} FROM pending_artists WHERE email = ?", PENDING_COLUMNS);
        let row = sqlx::query_as::<_, PendingArtistRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_pending(r)?)),
            None => Ok(None),
        }
    }

    async fn list_pending(&self) -> Result<Vec<PendingArtist>> {
        let sql = format!(
            "SELECT {} FROM pending_artists WHERE status = 'Pending' ORDER BY created_at ASC",
            PENDING_COLUMNS
        );
        let rows = sqlx::query_as::<_, PendingArtistRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_pending).collect()
    }

    async fn mark_rejected(&self, id: Uuid, reviewed_by: Uuid) -> Result<PendingArtist> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE pending_artists
            SET status = 'Rejected', reviewed_by = ?, reviewed_at = ?, updated_at = ?
            WHERE id = ? AND status = 'Pending'
            "#,
        )
        .bind(reviewed_by.to_string())
        .bind(now)
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::BadRequest(
                "Application is not pending review".to_string(),
            ));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated application".to_string())
        })
    }
}
