use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{Booking, Role, User},
    error::Result,
    repository::UserRepository,
    service::DashboardStats,
};

#[derive(Debug, Deserialize)]
pub struct ForceCancelDto {
    pub reason: Option<String>,
    pub refund_cents: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ForceRefundDto {
    pub amount_cents: i64,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveDisputeDto {
    pub decision: String,
    pub refund_cents: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersParams {
    pub role: Role,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<Vec<User>>> {
    let users = state
        .service_context
        .user_repo
        .list_by_role(params.role, params.limit, params.offset)
        .await?;

    Ok(Json(users))
}

pub async fn stats(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<DashboardStats>> {
    let stats = state
        .service_context
        .report_service
        .dashboard_stats(&current.user)
        .await?;

    Ok(Json(stats))
}

pub async fn force_cancel(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(dto): Json<ForceCancelDto>,
) -> Result<Json<Booking>> {
    let booking = state
        .service_context
        .booking_service
        .force_cancel(&current.user, id, dto.reason, dto.refund_cents)
        .await?;

    Ok(Json(booking))
}

pub async fn force_refund(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(dto): Json<ForceRefundDto>,
) -> Result<Json<Booking>> {
    let booking = state
        .service_context
        .payment_service
        .force_refund(&current.user, id, dto.amount_cents, dto.note.as_deref())
        .await?;

    Ok(Json(booking))
}

pub async fn resolve_dispute(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(dto): Json<ResolveDisputeDto>,
) -> Result<Json<Booking>> {
    let booking = state
        .service_context
        .booking_service
        .resolve_dispute(&current.user, id, dto.decision, dto.refund_cents)
        .await?;

    Ok(Json(booking))
}
