use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::Review,
    error::{AppError, Result},
    repository::ReviewRepository,
};

#[derive(FromRow)]
struct ReviewRow {
    id: String,
    booking_id: String,
    customer_id: String,
    artist_id: String,
    rating: i64,
    comment: Option<String>,
    visible: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const REVIEW_COLUMNS: &str =
    "id, booking_id, customer_id, artist_id, rating, comment, visible, created_at, updated_at";

pub struct SqliteReviewRepository {
    pool: SqlitePool,
}

impl SqliteReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_review(row: ReviewRow) -> Result<Review> {
        Ok(Review {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            booking_id: Uuid::parse_str(&row.booking_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            customer_id: Uuid::parse_str(&row.customer_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            artist_id: Uuid::parse_str(&row.artist_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            rating: row.rating,
            comment: row.comment,
            visible: row.visible != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl ReviewRepository for SqliteReviewRepository {
    async fn create(&self, review: Review) -> Result<Review> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO reviews (id, booking_id, customer_id, artist_id, rating, comment, visible, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(review.id.to_string())
        .bind(review.booking_id.to_string())
        .bind(review.customer_id.to_string())
        .bind(review.artist_id.to_string())
        .bind(review.rating)
        .bind(&review.comment)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("A review already exists for this booking".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

        self.find_by_id(review.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created review".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>> {
        let sql = format!("SELECT {} FROM reviews WHERE id = ?", REVIEW_COLUMNS);
        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_review(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Review>> {
        let sql = format!("SELECT {} FROM reviews WHERE booking_id = ?", REVIEW_COLUMNS);
        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(booking_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_review(r)?)),
            None => Ok(None),
        }
    }

    async fn list_by_artist(&self, artist_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Review>> {
        let sql = format!(
            "SELECT {} FROM reviews WHERE artist_id = ? AND visible = 1 \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            REVIEW_COLUMNS
        );
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(artist_id.to_string())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_review).collect()
    }

    async fn update(&self, review: &Review) -> Result<Review> {
        let now = Utc::now().naive_utc();

        sqlx::query("UPDATE reviews SET rating = ?, comment = ?, updated_at = ? WHERE id = ?")
            .bind(review.rating)
            .bind(&review.comment)
            .bind(now)
            .bind(review.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(review.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated review".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn set_visibility(&self, id: Uuid, visible: bool) -> Result<Review> {
        let now = Utc::now().naive_utc();

        sqlx::query("UPDATE reviews SET visible = ?, updated_at = ? WHERE id = ?")
            .bind(visible as i64)
            .bind(now)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Review not found".to_string()))
    }

    async fn aggregate_for_artist(&self, artist_id: Uuid) -> Result<(f64, i64)> {
        #[derive(FromRow)]
        struct AggregateRow {
            avg_rating: Option<f64>,
            total: i64,
        }

        let row = sqlx::query_as::<_, AggregateRow>(
            "SELECT AVG(rating) AS avg_rating, COUNT(*) AS total \
             FROM reviews WHERE artist_id = ? AND visible = 1",
        )
        .bind(artist_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((row.avg_rating.unwrap_or(0.0), row.total))
    }

    async fn count_visible(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE visible = 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count)
    }
}
