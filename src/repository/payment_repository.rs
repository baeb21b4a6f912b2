use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Payment, PaymentStatus},
    error::{AppError, Result},
    repository::PaymentRepository,
};

#[derive(FromRow)]
struct PaymentRow {
    id: String,
    booking_id: String,
    customer_id: String,
    artist_id: String,
    amount_cents: i64,
    currency: String,
    charge_id: Option<String>,
    status: String,
    platform_fee_cents: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const PAYMENT_COLUMNS: &str = "id, booking_id, customer_id, artist_id, amount_cents, currency, \
     charge_id, status, platform_fee_cents, created_at, updated_at";

pub struct SqlitePaymentRepository {
    pool: SqlitePool,
}

impl SqlitePaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_payment(row: PaymentRow) -> Result<Payment> {
        Ok(Payment {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            booking_id: Uuid::parse_str(&row.booking_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            customer_id: Uuid::parse_str(&row.customer_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            artist_id: Uuid::parse_str(&row.artist_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            amount_cents: row.amount_cents,
            currency: row.currency,
            charge_id: row.charge_id,
            status: Self::parse_status(&row.status)?,
            platform_fee_cents: row.platform_fee_cents,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn parse_status(s: &str) -> Result<PaymentStatus> {
        match s {
            "Pending" => Ok(PaymentStatus::Pending),
            "Held" => Ok(PaymentStatus::Held),
            "Succeeded" => Ok(PaymentStatus::Succeeded),
            "Failed" => Ok(PaymentStatus::Failed),
            "Refunded" => Ok(PaymentStatus::Refunded),
            _ => Err(AppError::Database(format!("Invalid payment status: {}", s))),
        }
    }

    fn status_to_str(status: PaymentStatus) -> &'static str {
        match status {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Held => "Held",
            PaymentStatus::Succeeded => "Succeeded",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Refunded => "Refunded",
        }
    }

    async fn fetch_where(&self, clause: &str, bind: String) -> Result<Vec<Payment>> {
        let sql = format!(
            "SELECT {} FROM payments WHERE {} ORDER BY created_at DESC",
            PAYMENT_COLUMNS, clause
        );
        let rows = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(bind)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_payment).collect()
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn create(&self, payment: Payment) -> Result<Payment> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, booking_id, customer_id, artist_id, amount_cents, currency,
                charge_id, status, platform_fee_cents, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.id.to_string())
        .bind(payment.booking_id.to_string())
        .bind(payment.customer_id.to_string())
        .bind(payment.artist_id.to_string())
        .bind(payment.amount_cents)
        .bind(&payment.currency)
        .bind(&payment.charge_id)
        .bind(Self::status_to_str(payment.status))
        .bind(payment.platform_fee_cents)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(payment.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created payment".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>> {
        let sql = format!("SELECT {} FROM payments WHERE id = ?", PAYMENT_COLUMNS);
        let row = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_payment(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Vec<Payment>> {
        self.fetch_where("booking_id = ?", booking_id.to_string()).await
    }

    async fn find_by_charge_id(&self, charge_id: &str) -> Result<Option<Payment>> {
        let sql = format!("SELECT {} FROM payments WHERE charge_id = ?", PAYMENT_COLUMNS);
        let row = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(charge_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_payment(r)?)),
            None => Ok(None),
        }
    }

    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Payment>> {
        self.fetch_where("customer_id = ?", customer_id.to_string()).await
    }

    async fn list_for_artist(&self, artist_id: Uuid) -> Result<Vec<Payment>> {
        self.fetch_where("artist_id = ?", artist_id.to_string()).await
    }

    async fn list_all(&self, limit: i64, offset: i64) -> Result<Vec<Payment>> {
        let sql = format!(
            "SELECT {} FROM payments ORDER BY created_at DESC LIMIT ? OFFSET ?",
            PAYMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_payment).collect()
    }

    async fn update_status(&self, id: Uuid, status: PaymentStatus) -> Result<Payment> {
        let now = Utc::now().naive_utc();

        sqlx::query("UPDATE payments SET status = ?, updated_at = ? WHERE id = ?")
            .bind(Self::status_to_str(status))
            .bind(now)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated payment".to_string())
        })
    }

    async fn succeeded_revenue_cents(&self) -> Result<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(amount_cents) FROM payments WHERE status = 'Succeeded'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(total.unwrap_or(0))
    }
}
