use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub artist_id: Uuid,
    pub category_id: Option<Uuid>,
    pub status: BookingStatus,
    pub payment_status: BookingPaymentStatus,
    pub pricing_type: PricingType,
    pub payment_type: PaymentType,
    pub total_amount_cents: i64,
    pub amount_paid_cents: i64,
    pub amount_refunded_cents: i64,
    pub advance_percentage: i64,
    pub revisions_used: i64,
    pub revision_limit: i64,
    pub estimated_start_date: DateTime<Utc>,
    pub cancellation_window_hours: i64,
    pub location: Option<String>,
    pub special_requests: Option<String>,
    pub custom_quote: Option<CustomQuote>,
    pub cancellation: Option<Cancellation>,
    pub dispute: Option<Dispute>,
    pub final_approval: Option<FinalApproval>,
    pub admin_notes: Option<String>,
    /// Optimistic concurrency: bumped on every mutation.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    InProgress,
    Review,
    Completed,
    Cancelled,
    Declined,
}

impl BookingStatus {
    /// Completed, Cancelled and Declined admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::Declined
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::InProgress => "InProgress",
            BookingStatus::Review => "Review",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Declined => "Declined",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingPaymentStatus {
    Pending,
    Held,
    Paid,
    Refunded,
    Partial,
    Failed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PricingType {
    Package,
    CustomQuote,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentType {
    Full,
    Advance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomQuote {
    pub amount_cents: i64,
    pub approved: bool,
    pub requested_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cancellation {
    pub cancelled_by: Uuid,
    pub reason: Option<String>,
    pub refund_amount_cents: i64,
    pub refund_status: RefundStatus,
    pub window_hours: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RefundStatus {
    Pending,
    Processed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    pub status: DisputeStatus,
    pub reason: String,
    pub admin_decision: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DisputeStatus {
    Open,
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalApproval {
    pub approved_by: Uuid,
    pub notes: Option<String>,
    pub approved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub requested_by: Uuid,
    pub description: Option<String>,
    pub status: RevisionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RevisionStatus {
    Requested,
    Addressed,
}

/// Draft for a new booking; the customer comes from the authenticated
/// actor, never the payload.
#[derive(Debug, Clone)]
pub struct CreateBookingRequest {
    pub artist_id: Uuid,
    pub category_id: Option<Uuid>,
    pub pricing_type: PricingType,
    pub payment_type: PaymentType,
    /// Caller-supplied total; only consulted when no package price or
    /// approved quote resolves the amount.
    pub total_amount_cents: Option<i64>,
    pub package_price_cents: Option<i64>,
    pub advance_percentage: i64,
    pub estimated_start_date: DateTime<Utc>,
    pub cancellation_window_hours: i64,
    pub revision_limit: i64,
    pub location: Option<String>,
    pub special_requests: Option<String>,
}

/// Filters for role-scoped booking listings. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub customer_id: Option<Uuid>,
    pub artist_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
    pub payment_status: Option<BookingPaymentStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub min_amount_cents: Option<i64>,
    pub max_amount_cents: Option<i64>,
    /// Matched case-insensitively against location and special_requests.
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
