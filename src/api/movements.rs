use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::types::{MovementDto, Paged};
use super::validation;
use super::{ApiError, AppState};
use crate::services::CreateMovement;
use crate::services::movement_service::MovementListFilter;

#[derive(Deserialize)]
pub struct CreateMovementRequest {
    pub equipment_id: Option<i32>,
    pub movement_type: Option<String>,
    pub user_id: Option<i32>,
    pub note: Option<String>,
    pub moved_at: Option<String>,
}

#[derive(Deserialize)]
pub struct MovementListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub equipment_id: Option<i32>,
    pub movement_type: Option<String>,
    pub user_id: Option<i32>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// POST /movimentacoes — appends to the ledger and drives the status
/// transition in the same transaction
pub async fn create_movement(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateMovementRequest>,
) -> Result<(StatusCode, Json<MovementDto>), ApiError> {
    let mut details = vec![];
    let equipment_id = validation::require_id(&mut details, "equipment_id", payload.equipment_id);
    let movement_type =
        validation::require_movement_type(&mut details, payload.movement_type.as_deref());
    let user_id = validation::require_id(&mut details, "user_id", payload.user_id);
    let moved_at =
        validation::optional_timestamp(&mut details, "moved_at", payload.moved_at.as_deref());

    if !details.is_empty() {
        return Err(ApiError::validation(details));
    }

    let input = CreateMovement {
        equipment_id: equipment_id.unwrap_or_default(),
        movement_type: movement_type.unwrap_or(crate::models::MovementType::Entrada),
        user_id: user_id.unwrap_or_default(),
        note: payload.note,
        moved_at,
    };

    let created = state.movement_service().create(input).await?;

    tracing::info!(
        "Movement recorded: {} equipment {}",
        created.movement_type,
        equipment_id.unwrap_or_default(),
    );

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /movimentacoes — ledger query, newest first
pub async fn list_movements(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MovementListQuery>,
) -> Result<Json<Paged<MovementDto>>, ApiError> {
    let (page, limit) = validation::pagination(query.page, query.limit);

    let mut details = vec![];
    let movement_type =
        validation::optional_movement_type(&mut details, query.movement_type.as_deref());
    let from = validation::optional_range_bound(&mut details, "from", query.from.as_deref(), false);
    let to = validation::optional_range_bound(&mut details, "to", query.to.as_deref(), true);

    if !details.is_empty() {
        return Err(ApiError::validation(details));
    }

    let filter = MovementListFilter {
        equipment_id: query.equipment_id,
        movement_type,
        user_id: query.user_id,
        from,
        to,
    };

    let rows = state.movement_service().list(filter, page, limit).await?;

    Ok(Json(rows.into()))
}

/// GET /movimentacoes/equipamento/{id}
pub async fn list_by_equipment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paged<MovementDto>>, ApiError> {
    let (page, limit) = validation::pagination(query.page, query.limit);

    let rows = state
        .movement_service()
        .list_by_equipment(id, page, limit)
        .await?;

    Ok(Json(rows.into()))
}

/// GET /movimentacoes/usuario/{id}
pub async fn list_by_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paged<MovementDto>>, ApiError> {
    let (page, limit) = validation::pagination(query.page, query.limit);

    let rows = state
        .movement_service()
        .list_by_user(id, page, limit)
        .await?;

    Ok(Json(rows.into()))
}
