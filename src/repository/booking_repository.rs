use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        Booking, BookingFilter, BookingPaymentStatus, BookingStatus, Cancellation, CustomQuote,
        Dispute, DisputeStatus, FinalApproval, PaymentType, PricingType, RefundStatus, Revision,
        RevisionStatus,
    },
    error::{AppError, Result},
    repository::BookingRepository,
};

#[derive(FromRow)]
struct BookingRow {
    id: String,
    customer_id: String,
    artist_id: String,
    category_id: Option<String>,
    status: String,
    payment_status: String,
    pricing_type: String,
    payment_type: String,
    total_amount_cents: i64,
    amount_paid_cents: i64,
    amount_refunded_cents: i64,
    advance_percentage: i64,
    revisions_used: i64,
    revision_limit: i64,
    estimated_start_date: NaiveDateTime,
    cancellation_window_hours: i64,
    location: Option<String>,
    special_requests: Option<String>,
    quote_amount_cents: Option<i64>,
    quote_approved: i64,
    quote_requested_at: Option<NaiveDateTime>,
    quote_approved_at: Option<NaiveDateTime>,
    cancelled_by: Option<String>,
    cancellation_reason: Option<String>,
    cancellation_refund_cents: Option<i64>,
    cancellation_refund_status: Option<String>,
    dispute_status: Option<String>,
    dispute_reason: Option<String>,
    dispute_decision: Option<String>,
    final_approved_by: Option<String>,
    final_approval_notes: Option<String>,
    final_approved_at: Option<NaiveDateTime>,
    admin_notes: Option<String>,
    version: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const BOOKING_COLUMNS: &str = "id, customer_id, artist_id, category_id, status, payment_status, \
     pricing_type, payment_type, total_amount_cents, amount_paid_cents, amount_refunded_cents, \
     advance_percentage, revisions_used, revision_limit, estimated_start_date, \
     cancellation_window_hours, location, special_requests, quote_amount_cents, quote_approved, \
     quote_requested_at, quote_approved_at, cancelled_by, cancellation_reason, \
     cancellation_refund_cents, cancellation_refund_status, dispute_status, dispute_reason, \
     dispute_decision, final_approved_by, final_approval_notes, final_approved_at, admin_notes, \
     version, created_at, updated_at";

pub struct SqliteBookingRepository {
    pool: SqlitePool,
}

impl SqliteBookingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_uuid(s: &str) -> Result<Uuid> {
        Uuid::parse_str(s).map_err(|e| AppError::Database(e.to_string()))
    }

    fn utc(dt: NaiveDateTime) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(dt, Utc)
    }

    fn parse_status(s: &str) -> Result<BookingStatus> {
        match s {
            "Pending" => Ok(BookingStatus::Pending),
            "InProgress" => Ok(BookingStatus::InProgress),
            "Review" => Ok(BookingStatus::Review),
            "Completed" => Ok(BookingStatus::Completed),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            "Declined" => Ok(BookingStatus::Declined),
            _ => Err(AppError::Database(format!("Invalid booking status: {}", s))),
        }
    }

    fn payment_status_to_str(status: BookingPaymentStatus) -> &'static str {
        match status {
            BookingPaymentStatus::Pending => "Pending",
            BookingPaymentStatus::Held => "Held",
            BookingPaymentStatus::Paid => "Paid",
            BookingPaymentStatus::Refunded => "Refunded",
            BookingPaymentStatus::Partial => "Partial",
            BookingPaymentStatus::Failed => "Failed",
        }
    }

    fn parse_payment_status(s: &str) -> Result<BookingPaymentStatus> {
        match s {
            "Pending" => Ok(BookingPaymentStatus::Pending),
            "Held" => Ok(BookingPaymentStatus::Held),
            "Paid" => Ok(BookingPaymentStatus::Paid),
            "Refunded" => Ok(BookingPaymentStatus::Refunded),
            "Partial" => Ok(BookingPaymentStatus::Partial),
            "Failed" => Ok(BookingPaymentStatus::Failed),
            _ => Err(AppError::Database(format!("Invalid payment status: {}", s))),
        }
    }

    fn parse_pricing_type(s: &str) -> Result<PricingType> {
        match s {
            "Package" => Ok(PricingType::Package),
            "CustomQuote" => Ok(PricingType::CustomQuote),
            _ => Err(AppError::Database(format!("Invalid pricing type: {}", s))),
        }
    }

    fn parse_payment_type(s: &str) -> Result<PaymentType> {
        match s {
            "Full" => Ok(PaymentType::Full),
            "Advance" => Ok(PaymentType::Advance),
            _ => Err(AppError::Database(format!("Invalid payment type: {}", s))),
        }
    }

    fn parse_refund_status(s: &str) -> Result<RefundStatus> {
        match s {
            "Pending" => Ok(RefundStatus::Pending),
            "Processed" => Ok(RefundStatus::Processed),
            "Failed" => Ok(RefundStatus::Failed),
            _ => Err(AppError::Database(format!("Invalid refund status: {}", s))),
        }
    }

    fn refund_status_to_str(status: RefundStatus) -> &'static str {
        match status {
            RefundStatus::Pending => "Pending",
            RefundStatus::Processed => "Processed",
            RefundStatus::Failed => "Failed",
        }
    }

    fn row_to_booking(row: BookingRow) -> Result<Booking> {
        let custom_quote = match row.quote_amount_cents {
            Some(amount_cents) => Some(CustomQuote {
                amount_cents,
                approved: row.quote_approved != 0,
                requested_at: row
                    .quote_requested_at
                    .map(Self::utc)
                    .unwrap_or_else(|| Self::utc(row.created_at)),
                approved_at: row.quote_approved_at.map(Self::utc),
            }),
            None => None,
        };

        let cancellation = match row.cancelled_by {
            Some(ref by) => Some(Cancellation {
                cancelled_by: Self::parse_uuid(by)?,
                reason: row.cancellation_reason.clone(),
                refund_amount_cents: row.cancellation_refund_cents.unwrap_or(0),
                refund_status: row
                    .cancellation_refund_status
                    .as_deref()
                    .map(Self::parse_refund_status)
                    .transpose()?
                    .unwrap_or(RefundStatus::Pending),
                window_hours: row.cancellation_window_hours,
            }),
            None => None,
        };

        let dispute = match row.dispute_status {
            Some(ref s) => Some(Dispute {
                status: match s.as_str() {
                    "Open" => DisputeStatus::Open,
                    "Resolved" => DisputeStatus::Resolved,
                    other => {
                        return Err(AppError::Database(format!(
                            "Invalid dispute status: {}",
                            other
                        )))
                    }
                },
                reason: row.dispute_reason.clone().unwrap_or_default(),
                admin_decision: row.dispute_decision.clone(),
            }),
            None => None,
        };

        let final_approval = match row.final_approved_by {
            Some(ref by) => Some(FinalApproval {
                approved_by: Self::parse_uuid(by)?,
                notes: row.final_approval_notes.clone(),
                approved_at: row
                    .final_approved_at
                    .map(Self::utc)
                    .unwrap_or_else(|| Self::utc(row.updated_at)),
            }),
            None => None,
        };

        Ok(Booking {
            id: Self::parse_uuid(&row.id)?,
            customer_id: Self::parse_uuid(&row.customer_id)?,
            artist_id: Self::parse_uuid(&row.artist_id)?,
            category_id: row.category_id.as_deref().map(Self::parse_uuid).transpose()?,
            status: Self::parse_status(&row.status)?,
            payment_status: Self::parse_payment_status(&row.payment_status)?,
            pricing_type: Self::parse_pricing_type(&row.pricing_type)?,
            payment_type: Self::parse_payment_type(&row.payment_type)?,
            total_amount_cents: row.total_amount_cents,
            amount_paid_cents: row.amount_paid_cents,
            amount_refunded_cents: row.amount_refunded_cents,
            advance_percentage: row.advance_percentage,
            revisions_used: row.revisions_used,
            revision_limit: row.revision_limit,
            estimated_start_date: Self::utc(row.estimated_start_date),
            cancellation_window_hours: row.cancellation_window_hours,
            location: row.location,
            special_requests: row.special_requests,
            custom_quote,
            cancellation,
            dispute,
            final_approval,
            admin_notes: row.admin_notes,
            version: row.version,
            created_at: Self::utc(row.created_at),
            updated_at: Self::utc(row.updated_at),
        })
    }

    fn push_filter_clauses<'a>(
        builder: &mut QueryBuilder<'a, Sqlite>,
        filter: &'a BookingFilter,
    ) {
        builder.push(" WHERE 1=1");
        if let Some(id) = filter.customer_id {
            builder.push(" AND customer_id = ").push_bind(id.to_string());
        }
        if let Some(id) = filter.artist_id {
            builder.push(" AND artist_id = ").push_bind(id.to_string());
        }
        if let Some(id) = filter.category_id {
            builder.push(" AND category_id = ").push_bind(id.to_string());
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(ps) = filter.payment_status {
            builder
                .push(" AND payment_status = ")
                .push_bind(Self::payment_status_to_str(ps));
        }
        if let Some(start) = filter.start_date {
            builder
                .push(" AND estimated_start_date >= ")
                .push_bind(start.naive_utc());
        }
        if let Some(end) = filter.end_date {
            builder
                .push(" AND estimated_start_date <= ")
                .push_bind(end.naive_utc());
        }
        if let Some(min) = filter.min_amount_cents {
            builder.push(" AND total_amount_cents >= ").push_bind(min);
        }
        if let Some(max) = filter.max_amount_cents {
            builder.push(" AND total_amount_cents <= ").push_bind(max);
        }
        if let Some(ref search) = filter.search {
            let pattern = format!("%{}%", search);
            builder
                .push(" AND (location LIKE ")
                .push_bind(pattern.clone())
                .push(" OR special_requests LIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepository {
    async fn create(&self, booking: Booking) -> Result<Booking> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, customer_id, artist_id, category_id, status, payment_status,
                pricing_type, payment_type, total_amount_cents, amount_paid_cents,
                amount_refunded_cents, advance_percentage, revisions_used, revision_limit,
                estimated_start_date, cancellation_window_hours, location, special_requests,
                quote_amount_cents, quote_approved, quote_requested_at,
                version, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(booking.id.to_string())
        .bind(booking.customer_id.to_string())
        .bind(booking.artist_id.to_string())
        .bind(booking.category_id.map(|id| id.to_string()))
        .bind(booking.status.as_str())
        .bind(Self::payment_status_to_str(booking.payment_status))
        .bind(match booking.pricing_type {
            PricingType::Package => "Package",
            PricingType::CustomQuote => "CustomQuote",
        })
        .bind(match booking.payment_type {
            PaymentType::Full => "Full",
            PaymentType::Advance => "Advance",
        })
        .bind(booking.total_amount_cents)
        .bind(booking.amount_paid_cents)
        .bind(booking.amount_refunded_cents)
        .bind(booking.advance_percentage)
        .bind(booking.revisions_used)
        .bind(booking.revision_limit)
        .bind(booking.estimated_start_date.naive_utc())
        .bind(booking.cancellation_window_hours)
        .bind(&booking.location)
        .bind(&booking.special_requests)
        .bind(booking.custom_quote.as_ref().map(|q| q.amount_cents))
        .bind(booking.custom_quote.as_ref().map(|q| q.approved as i64).unwrap_or(0))
        .bind(booking.custom_quote.as_ref().map(|q| q.requested_at.naive_utc()))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(booking.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created booking".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        let sql = format!("SELECT {} FROM bookings WHERE id = ?", BOOKING_COLUMNS);
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_booking(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM bookings", BOOKING_COLUMNS));
        Self::push_filter_clauses(&mut builder, filter);
        builder.push(" ORDER BY created_at DESC");
        builder.push(" LIMIT ").push_bind(filter.limit);
        builder.push(" OFFSET ").push_bind(filter.offset);

        let rows = builder
            .build_query_as::<BookingRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_booking).collect()
    }

    async fn count(&self, filter: &BookingFilter) -> Result<i64> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM bookings");
        Self::push_filter_clauses(&mut builder, filter);

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count)
    }

    async fn update(&self, booking: &Booking) -> Result<Booking> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = ?,
                payment_status = ?,
                total_amount_cents = ?,
                amount_paid_cents = ?,
                amount_refunded_cents = ?,
                advance_percentage = ?,
                revisions_used = ?,
                estimated_start_date = ?,
                location = ?,
                special_requests = ?,
                quote_amount_cents = ?,
                quote_approved = ?,
                quote_requested_at = ?,
                quote_approved_at = ?,
                cancelled_by = ?,
                cancellation_reason = ?,
                cancellation_refund_cents = ?,
                cancellation_refund_status = ?,
                dispute_status = ?,
                dispute_reason = ?,
                dispute_decision = ?,
                final_approved_by = ?,
                final_approval_notes = ?,
                final_approved_at = ?,
                admin_notes = ?,
                version = version + 1,
                updated_at = ?
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(booking.status.as_str())
        .bind(Self::payment_status_to_str(booking.payment_status))
        .bind(booking.total_amount_cents)
        .bind(booking.amount_paid_cents)
        .bind(booking.amount_refunded_cents)
        .bind(booking.advance_percentage)
        .bind(booking.revisions_used)
        .bind(booking.estimated_start_date.naive_utc())
        .bind(&booking.location)
        .bind(&booking.special_requests)
        .bind(booking.custom_quote.as_ref().map(|q| q.amount_cents))
        .bind(booking.custom_quote.as_ref().map(|q| q.approved as i64).unwrap_or(0))
        .bind(booking.custom_quote.as_ref().map(|q| q.requested_at.naive_utc()))
        .bind(booking.custom_quote.as_ref().and_then(|q| q.approved_at).map(|dt| dt.naive_utc()))
        .bind(booking.cancellation.as_ref().map(|c| c.cancelled_by.to_string()))
        .bind(booking.cancellation.as_ref().and_then(|c| c.reason.clone()))
        .bind(booking.cancellation.as_ref().map(|c| c.refund_amount_cents))
        .bind(
            booking
                .cancellation
                .as_ref()
                .map(|c| Self::refund_status_to_str(c.refund_status)),
        )
        .bind(booking.dispute.as_ref().map(|d| match d.status {
            DisputeStatus::Open => "Open",
            DisputeStatus::Resolved => "Resolved",
        }))
        .bind(booking.dispute.as_ref().map(|d| d.reason.clone()))
        .bind(booking.dispute.as_ref().and_then(|d| d.admin_decision.clone()))
        .bind(booking.final_approval.as_ref().map(|f| f.approved_by.to_string()))
        .bind(booking.final_approval.as_ref().and_then(|f| f.notes.clone()))
        .bind(booking.final_approval.as_ref().map(|f| f.approved_at.naive_utc()))
        .bind(&booking.admin_notes)
        .bind(now)
        .bind(booking.id.to_string())
        .bind(booking.version)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Booking was modified concurrently, retry with fresh state".to_string(),
            ));
        }

        self.find_by_id(booking.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated booking".to_string())
        })
    }

    async fn add_revision(&self, revision: Revision) -> Result<Revision> {
        sqlx::query(
            r#"
            INSERT INTO booking_revisions (id, booking_id, requested_by, description, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(revision.id.to_string())
        .bind(revision.booking_id.to_string())
        .bind(revision.requested_by.to_string())
        .bind(&revision.description)
        .bind(match revision.status {
            RevisionStatus::Requested => "Requested",
            RevisionStatus::Addressed => "Addressed",
        })
        .bind(revision.created_at.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(revision)
    }

    async fn revisions_for(&self, booking_id: Uuid) -> Result<Vec<Revision>> {
        #[derive(FromRow)]
        struct RevisionRow {
            id: String,
            booking_id: String,
            requested_by: String,
            description: Option<String>,
            status: String,
            created_at: NaiveDateTime,
        }

        let rows = sqlx::query_as::<_, RevisionRow>(
            r#"
            SELECT id, booking_id, requested_by, description, status, created_at
            FROM booking_revisions
            WHERE booking_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(booking_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(|r| {
                Ok(Revision {
                    id: Self::parse_uuid(&r.id)?,
                    booking_id: Self::parse_uuid(&r.booking_id)?,
                    requested_by: Self::parse_uuid(&r.requested_by)?,
                    description: r.description,
                    status: match r.status.as_str() {
                        "Addressed" => RevisionStatus::Addressed,
                        _ => RevisionStatus::Requested,
                    },
                    created_at: Self::utc(r.created_at),
                })
            })
            .collect()
    }

    async fn count_with_status(&self, status: BookingStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count)
    }

    async fn count_all(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count)
    }
}
