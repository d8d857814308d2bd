use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::types::{MessageResponse, Paged, UserDto};
use super::validation;
use super::{ApiError, AppState, auth};
use crate::models::UserRole;
use crate::services::{AuthIdentity, CreateUser, UpdateUser};

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub active: Option<i32>,
}

/// POST /usuarios (admin only)
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthIdentity>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    auth::require_admin(&state, &identity).await?;

    let mut details = vec![];
    let name = validation::require_min_len(&mut details, "name", payload.name.as_deref(), 3);
    let login = validation::require_min_len(&mut details, "login", payload.login.as_deref(), 3);
    let password =
        validation::require_min_len(&mut details, "password", payload.password.as_deref(), 6);
    let role = validation::optional_role(&mut details, payload.role.as_deref());

    if !details.is_empty() {
        return Err(ApiError::validation(details));
    }

    let input = CreateUser {
        name: name.unwrap_or_default(),
        login: login.unwrap_or_default(),
        password: password.unwrap_or_default(),
        role: role.unwrap_or(UserRole::Usuario),
    };

    let created = state.user_service().create(input).await?;

    tracing::info!("User created: {}", created.login);

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /usuarios
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paged<UserDto>>, ApiError> {
    let (page, limit) = validation::pagination(query.page, query.limit);

    let users = state.user_service().list(page, limit).await?;

    Ok(Json(users.into()))
}

/// GET /usuarios/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<UserDto>, ApiError> {
    let user = state.user_service().get(id).await?;
    Ok(Json(user))
}

/// PUT /usuarios/{id} (admin only)
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserDto>, ApiError> {
    auth::require_admin(&state, &identity).await?;

    let mut details = vec![];
    let name = validation::optional_min_len(&mut details, "name", payload.name.as_deref(), 3);
    let login = validation::optional_min_len(&mut details, "login", payload.login.as_deref(), 3);
    let password =
        validation::optional_min_len(&mut details, "password", payload.password.as_deref(), 6);
    let role = validation::optional_role(&mut details, payload.role.as_deref());

    if let Some(active) = payload.active
        && !matches!(active, 0 | 1)
    {
        details.push(super::error::FieldError::new("active", "Deve ser 0 ou 1"));
    }

    if !details.is_empty() {
        return Err(ApiError::validation(details));
    }

    let input = UpdateUser {
        name,
        login,
        password,
        role,
        active: payload.active,
    };

    let updated = state.user_service().update(id, input).await?;

    Ok(Json(updated))
}

/// DELETE /usuarios/{id} (admin only) — soft deactivation, never a row delete
pub async fn deactivate_user(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    auth::require_admin(&state, &identity).await?;

    state.user_service().deactivate(id).await?;

    tracing::info!("User deactivated: {}", id);

    Ok(Json(MessageResponse {
        message: "Usuário desativado com sucesso".to_string(),
    }))
}
