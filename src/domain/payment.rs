use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single gateway transaction against a booking. A booking accumulates
/// one of these per charge attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub artist_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub charge_id: Option<String>,
    pub status: PaymentStatus,
    pub platform_fee_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Held,
    Succeeded,
    Failed,
    Refunded,
}
