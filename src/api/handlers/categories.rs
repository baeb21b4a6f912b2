use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::Category,
    error::Result,
    repository::CategoryRepository,
};

#[derive(Debug, serde::Deserialize, Validate)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = state.service_context.category_repo.list_active().await?;
    Ok(Json(categories))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Json(dto): Json<CreateCategoryDto>,
) -> Result<(StatusCode, Json<Category>)> {
    dto.validate()?;

    let category = state
        .service_context
        .category_repo
        .create(&dto.name, dto.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}
