use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{
    api::state::AppState,
    domain::{Role, User},
    error::AppError,
    repository::UserRepository,
};

#[derive(Clone)]
pub struct CurrentUser {
    pub user: User,
}

fn bearer_token(request: &Request) -> Result<&str, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)
}

async fn resolve_user(state: &AppState, token: &str) -> Result<User, AppError> {
    let claims = state.service_context.auth_service.verify_token(token)?;

    let user = state
        .service_context
        .user_repo
        .find_by_id(claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !user.active {
        return Err(AppError::Unauthorized);
    }

    Ok(user)
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)?;
    let user = resolve_user(&state, token).await?;

    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)?;
    let user = resolve_user(&state, token).await?;

    if user.role != Role::Admin {
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}
