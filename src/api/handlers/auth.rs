use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::state::AppState,
    auth::AuthService,
    domain::{CreateUserRequest, CustomerProfile, Role, User},
    error::{AppError, Result},
    repository::UserRepository,
};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

/// Customer self-registration. Artists go through the application and
/// approval workflow instead.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    let ctx = &state.service_context;

    if ctx.user_repo.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let password_hash = AuthService::hash_password(&req.password)?;

    let user = ctx
        .user_repo
        .create(CreateUserRequest {
            email: req.email,
            password_hash,
            role: Role::Customer,
            name: req.name,
            phone: req.phone,
        })
        .await?;

    ctx.user_repo
        .create_customer_profile(CustomerProfile {
            user_id: user.id,
            address: req.address,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .await?;

    let token = ctx.auth_service.issue_token(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let ctx = &state.service_context;

    let user = ctx
        .user_repo
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !AuthService::verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    if !user.active {
        return Err(AppError::Unauthorized);
    }

    let token = ctx.auth_service.issue_token(&user)?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}
