use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::Notification,
    error::Result,
    repository::NotificationRepository,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub unread_only: bool,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct MarkAllResponse {
    pub marked: u64,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Notification>>> {
    let notifications = state
        .service_context
        .notification_repo
        .list_for_user(current.user.id, params.unread_only, params.limit, params.offset)
        .await?;

    Ok(Json(notifications))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>> {
    let notification = state
        .service_context
        .notification_repo
        .mark_read(id, current.user.id)
        .await?;

    Ok(Json(notification))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<MarkAllResponse>> {
    let marked = state
        .service_context
        .notification_repo
        .mark_all_read(current.user.id)
        .await?;

    Ok(Json(MarkAllResponse { marked }))
}
