use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{
        Booking, BookingFilter, BookingPaymentStatus, BookingStatus, CreateBookingRequest,
        PaymentType, PricingType, Revision, Role,
    },
    error::Result,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingDto {
    pub artist_id: Uuid,
    pub category_id: Option<Uuid>,
    pub pricing_type: PricingType,
    #[serde(default = "default_payment_type")]
    pub payment_type: PaymentType,
    pub total_amount_cents: Option<i64>,
    pub package_price_cents: Option<i64>,
    #[validate(range(min = 0, max = 100))]
    pub advance_percentage: Option<i64>,
    pub estimated_start_date: DateTime<Utc>,
    pub cancellation_window_hours: Option<i64>,
    pub revision_limit: Option<i64>,
    pub location: Option<String>,
    pub special_requests: Option<String>,
}

fn default_payment_type() -> PaymentType {
    PaymentType::Full
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<BookingStatus>,
    pub payment_status: Option<BookingPaymentStatus>,
    pub customer_id: Option<Uuid>,
    pub artist_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub min_amount_cents: Option<i64>,
    pub max_amount_cents: Option<i64>,
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub bookings: Vec<Booking>,
    pub total: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusDto {
    pub status: BookingStatus,
    pub reason: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CancelDto {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RevisionDto {
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteDto {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuoteDto {
    #[validate(range(min = 1))]
    pub amount_cents: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DisputeDto {
    #[validate(length(min = 1, message = "A dispute needs a reason"))]
    pub reason: String,
}

impl ListParams {
    fn into_filter(self, actor_role: Role) -> BookingFilter {
        // Cross-user scoping params only mean something for admins; the
        // service overwrites them for everyone else.
        let (customer_id, artist_id) = if actor_role == Role::Admin {
            (self.customer_id, self.artist_id)
        } else {
            (None, None)
        };

        BookingFilter {
            customer_id,
            artist_id,
            category_id: self.category_id,
            status: self.status,
            payment_status: self.payment_status,
            start_date: self.start_date,
            end_date: self.end_date,
            min_amount_cents: self.min_amount_cents,
            max_amount_cents: self.max_amount_cents,
            search: self.search,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(dto): Json<CreateBookingDto>,
) -> Result<(StatusCode, Json<Booking>)> {
    dto.validate()?;

    let defaults = state.service_context.booking_service.defaults();
    let request = CreateBookingRequest {
        artist_id: dto.artist_id,
        category_id: dto.category_id,
        pricing_type: dto.pricing_type,
        payment_type: dto.payment_type,
        total_amount_cents: dto.total_amount_cents,
        package_price_cents: dto.package_price_cents,
        advance_percentage: dto
            .advance_percentage
            .unwrap_or(defaults.default_advance_percentage),
        estimated_start_date: dto.estimated_start_date,
        cancellation_window_hours: dto
            .cancellation_window_hours
            .unwrap_or(defaults.default_cancellation_window_hours),
        revision_limit: dto.revision_limit.unwrap_or(defaults.default_revision_limit),
        location: dto.location,
        special_requests: dto.special_requests,
    };

    let booking = state
        .service_context
        .booking_service
        .create_booking(&current.user, request)
        .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>> {
    let filter = params.into_filter(current.user.role);
    let (bookings, total) = state
        .service_context
        .booking_service
        .list_bookings(&current.user, filter)
        .await?;

    Ok(Json(ListResponse { bookings, total }))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>> {
    let booking = state
        .service_context
        .booking_service
        .get_booking(&current.user, id)
        .await?;

    Ok(Json(booking))
}

/// Generic status patch; the transition engine decides whether the pair is
/// valid and the actor allowed. Cancellation routes through the refund path.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateStatusDto>,
) -> Result<Json<Booking>> {
    let service = &state.service_context.booking_service;

    let booking = if dto.status == BookingStatus::Cancelled {
        service.cancel(&current.user, id, dto.reason).await?
    } else {
        service
            .transition(&current.user, id, dto.status, dto.description, dto.notes)
            .await?
    };

    Ok(Json(booking))
}

pub async fn accept(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>> {
    let booking = state
        .service_context
        .booking_service
        .transition(&current.user, id, BookingStatus::InProgress, None, None)
        .await?;
    Ok(Json(booking))
}

pub async fn decline(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>> {
    let booking = state
        .service_context
        .booking_service
        .transition(&current.user, id, BookingStatus::Declined, None, None)
        .await?;
    Ok(Json(booking))
}

/// Artist marks the work as done and hands it to the customer for review.
pub async fn submit_for_review(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>> {
    let booking = state
        .service_context
        .booking_service
        .transition(&current.user, id, BookingStatus::Review, None, None)
        .await?;
    Ok(Json(booking))
}

pub async fn complete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(dto): Json<CompleteDto>,
) -> Result<Json<Booking>> {
    let booking = state
        .service_context
        .booking_service
        .transition(&current.user, id, BookingStatus::Completed, None, dto.notes)
        .await?;
    Ok(Json(booking))
}

pub async fn request_revision(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(dto): Json<RevisionDto>,
) -> Result<Json<Booking>> {
    let booking = state
        .service_context
        .booking_service
        .transition(
            &current.user,
            id,
            BookingStatus::InProgress,
            dto.description,
            None,
        )
        .await?;
    Ok(Json(booking))
}

pub async fn cancel(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(dto): Json<CancelDto>,
) -> Result<Json<Booking>> {
    let booking = state
        .service_context
        .booking_service
        .cancel(&current.user, id, dto.reason)
        .await?;
    Ok(Json(booking))
}

pub async fn list_revisions(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Revision>>> {
    let revisions = state
        .service_context
        .booking_service
        .revisions(&current.user, id)
        .await?;
    Ok(Json(revisions))
}

pub async fn set_quote(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(dto): Json<QuoteDto>,
) -> Result<Json<Booking>> {
    dto.validate()?;

    let booking = state
        .service_context
        .booking_service
        .set_quote(&current.user, id, dto.amount_cents)
        .await?;
    Ok(Json(booking))
}

pub async fn approve_quote(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>> {
    let booking = state
        .service_context
        .booking_service
        .approve_quote(&current.user, id)
        .await?;
    Ok(Json(booking))
}

pub async fn open_dispute(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(dto): Json<DisputeDto>,
) -> Result<Json<Booking>> {
    dto.validate()?;

    let booking = state
        .service_context
        .booking_service
        .open_dispute(&current.user, id, dto.reason)
        .await?;
    Ok(Json(booking))
}
