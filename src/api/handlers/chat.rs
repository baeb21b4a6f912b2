use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{ChatChannel, ChatMessage, Role},
    error::{AppError, Result},
    repository::ChatRepository,
};

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageDto {
    #[validate(length(min = 1, max = 4000))]
    pub body: String,
}

pub async fn list_channels(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<ChatChannel>>> {
    let channels = state
        .service_context
        .chat_repo
        .list_channels_for_user(current.user.id)
        .await?;

    Ok(Json(channels))
}

async fn load_channel_for(
    state: &AppState,
    actor_id: Uuid,
    actor_role: Role,
    channel_id: Uuid,
) -> Result<ChatChannel> {
    let channel = state
        .service_context
        .chat_repo
        .find_channel_by_id(channel_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chat channel not found".to_string()))?;

    if !channel.has_participant(actor_id) && actor_role != Role::Admin {
        return Err(AppError::Forbidden);
    }

    Ok(channel)
}

pub async fn list_messages(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(channel_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<ChatMessage>>> {
    let channel =
        load_channel_for(&state, current.user.id, current.user.role, channel_id).await?;

    let messages = state
        .service_context
        .chat_repo
        .list_messages(channel.id, params.limit, params.offset)
        .await?;

    Ok(Json(messages))
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(channel_id): Path<Uuid>,
    Json(dto): Json<SendMessageDto>,
) -> Result<(StatusCode, Json<ChatMessage>)> {
    dto.validate()?;

    let channel =
        load_channel_for(&state, current.user.id, current.user.role, channel_id).await?;

    // Admins can read a channel but only the two parties may speak in it.
    if !channel.has_participant(current.user.id) {
        return Err(AppError::Forbidden);
    }

    let message = state
        .service_context
        .chat_repo
        .add_message(ChatMessage {
            id: Uuid::new_v4(),
            channel_id: channel.id,
            sender_id: current.user.id,
            body: dto.body,
            created_at: Utc::now(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}
