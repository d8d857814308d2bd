use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::types::{EquipmentDto, EquipmentListItemDto, HistoryDto, Paged};
use super::validation;
use super::{ApiError, AppState};
use crate::services::{AuthIdentity, CreateEquipment, UpdateEquipment};
use crate::services::equipment_service::EquipmentListFilter;

#[derive(Deserialize)]
pub struct CreateEquipmentRequest {
    pub name: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub asset_tag: Option<String>,
    pub location: Option<String>,
    pub user_id: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateEquipmentRequest {
    pub name: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub asset_tag: Option<String>,
    pub location: Option<String>,
}

#[derive(Deserialize)]
pub struct EquipmentListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub user_id: Option<i32>,
    pub name: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub asset_tag: Option<String>,
    pub location: Option<String>,
    pub created_date: Option<String>,
    /// Free-text OR-search across name/model/serial/asset tag/location
    pub q: Option<String>,
}

/// POST /equipamentos — status is forced to `NO_DEPOSITO` regardless of input
pub async fn create_equipment(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthIdentity>,
    Json(payload): Json<CreateEquipmentRequest>,
) -> Result<(StatusCode, Json<EquipmentDto>), ApiError> {
    let mut details = vec![];
    let name = validation::require_min_len(&mut details, "name", payload.name.as_deref(), 3);
    let model = validation::require_min_len(&mut details, "model", payload.model.as_deref(), 2);
    let serial = validation::require_min_len(
        &mut details,
        "serial_number",
        payload.serial_number.as_deref(),
        3,
    );
    let asset_tag =
        validation::optional_numeric_string(&mut details, "asset_tag", payload.asset_tag.as_deref());
    let owner_id = validation::require_id(&mut details, "user_id", payload.user_id);

    if !details.is_empty() {
        return Err(ApiError::validation(details));
    }

    let input = CreateEquipment {
        name: name.unwrap_or_default(),
        model: model.unwrap_or_default(),
        serial_number: serial.unwrap_or_default(),
        asset_tag,
        location: payload
            .location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty()),
        owner_id: owner_id.unwrap_or_default(),
    };

    let created = state.equipment_service().create(input, &identity).await?;

    tracing::info!("Equipment registered: {} ({})", created.name, created.serial_number);

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /equipamentos — `DESCARTADO` excluded unless a status filter asks
pub async fn list_equipment(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EquipmentListQuery>,
) -> Result<Json<Paged<EquipmentListItemDto>>, ApiError> {
    let (page, limit) = validation::pagination(query.page, query.limit);

    let mut details = vec![];
    let status = validation::optional_status_filter(&mut details, query.status.as_deref());
    let created_date =
        validation::optional_date(&mut details, "created_date", query.created_date.as_deref());

    if !details.is_empty() {
        return Err(ApiError::validation(details));
    }

    let filter = EquipmentListFilter {
        status,
        user_id: query.user_id,
        name: query.name,
        model: query.model,
        serial_number: query.serial_number,
        asset_tag: query.asset_tag,
        location: query.location,
        created_date,
        search: query.q,
    };

    let rows = state.equipment_service().list(filter, page, limit).await?;

    Ok(Json(rows.into()))
}

/// GET /equipamentos/{id}
pub async fn get_equipment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<EquipmentDto>, ApiError> {
    let equipment = state.equipment_service().get(id).await?;
    Ok(Json(equipment))
}

/// GET /equipamentos/{id}/historico — audit trail, newest first
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<HistoryDto>>, ApiError> {
    let history = state.equipment_service().history(id).await?;
    Ok(Json(history))
}

/// PUT /equipamentos/{id} — responsibility is reassigned to the editor
pub async fn update_equipment(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateEquipmentRequest>,
) -> Result<Json<EquipmentDto>, ApiError> {
    let mut details = vec![];
    let name = validation::optional_min_len(&mut details, "name", payload.name.as_deref(), 3);
    let model = validation::optional_min_len(&mut details, "model", payload.model.as_deref(), 2);
    let serial = validation::optional_min_len(
        &mut details,
        "serial_number",
        payload.serial_number.as_deref(),
        3,
    );
    let asset_tag =
        validation::optional_numeric_string(&mut details, "asset_tag", payload.asset_tag.as_deref());

    if !details.is_empty() {
        return Err(ApiError::validation(details));
    }

    let input = UpdateEquipment {
        name,
        model,
        serial_number: serial,
        asset_tag,
        location: payload
            .location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty()),
    };

    let updated = state
        .equipment_service()
        .update(id, input, &identity)
        .await?;

    Ok(Json(updated))
}

/// DELETE /equipamentos/{id} — terminal discard, never a row delete
pub async fn discard_equipment(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AuthIdentity>,
    Path(id): Path<i32>,
) -> Result<Json<EquipmentDto>, ApiError> {
    let discarded = state.equipment_service().discard(id, &identity).await?;

    tracing::info!("Equipment discarded: {}", id);

    Ok(Json(discarded))
}
