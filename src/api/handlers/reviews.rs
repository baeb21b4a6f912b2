use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{CreateReviewRequest, Review},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewDto {
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityDto {
    pub visible: bool,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    let review = state
        .service_context
        .review_service
        .create_review(&current.user, request)
        .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Review>> {
    let review = state.service_context.review_service.get_review(id).await?;
    Ok(Json(review))
}

pub async fn list_by_artist(
    State(state): State<AppState>,
    Path(artist_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Review>>> {
    let reviews = state
        .service_context
        .review_service
        .list_by_artist(artist_id, params.limit, params.offset)
        .await?;

    Ok(Json(reviews))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateReviewDto>,
) -> Result<Json<Review>> {
    let review = state
        .service_context
        .review_service
        .update_review(&current.user, id, dto.rating, dto.comment)
        .await?;

    Ok(Json(review))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .review_service
        .delete_review(&current.user, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_visibility(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(dto): Json<VisibilityDto>,
) -> Result<Json<Review>> {
    let review = state
        .service_context
        .review_service
        .set_visibility(&current.user, id, dto.visible)
        .await?;

    Ok(Json(review))
}
