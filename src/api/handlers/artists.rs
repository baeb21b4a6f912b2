use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{ArtistApplication, ArtistProfile, PendingArtist},
    error::{AppError, Result},
    repository::UserRepository,
    service::ArtistPerformance,
};

#[derive(Debug, serde::Deserialize, Validate)]
pub struct ApplicationDto {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub phone: Option<String>,
    pub category_id: Option<Uuid>,
    pub bio: Option<String>,
    #[validate(range(min = 0))]
    pub hourly_rate_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
}

/// Public endpoint: prospective artists stage an application for admin
/// review.
pub async fn apply(
    State(state): State<AppState>,
    Json(dto): Json<ApplicationDto>,
) -> Result<(StatusCode, Json<PendingArtist>)> {
    dto.validate()?;

    let pending = state
        .service_context
        .approval_service
        .apply(ArtistApplication {
            email: dto.email,
            name: dto.name,
            phone: dto.phone,
            category_id: dto.category_id,
            bio: dto.bio,
            hourly_rate_cents: dto.hourly_rate_cents,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(pending)))
}

pub async fn list_pending(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<PendingArtist>>> {
    let pending = state
        .service_context
        .approval_service
        .list_pending(&current.user)
        .await?;

    Ok(Json(pending))
}

pub async fn approve(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApprovalResponse>> {
    let (user, _password) = state
        .service_context
        .approval_service
        .approve(&current.user, id)
        .await?;

    Ok(Json(ApprovalResponse {
        user_id: user.id,
        email: user.email,
        name: user.name,
    }))
}

pub async fn reject(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<PendingArtist>> {
    let pending = state
        .service_context
        .approval_service
        .reject(&current.user, id)
        .await?;

    Ok(Json(pending))
}

pub async fn profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ArtistProfile>> {
    let profile = state
        .service_context
        .user_repo
        .find_artist_profile(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Artist not found".to_string()))?;

    Ok(Json(profile))
}

pub async fn performance(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ArtistPerformance>> {
    let report = state
        .service_context
        .report_service
        .artist_performance(&current.user, id)
        .await?;

    Ok(Json(report))
}
