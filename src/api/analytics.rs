use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::types::{EquipmentReport, MovementReport};
use super::validation;
use super::{ApiError, AppState};

#[derive(Deserialize)]
pub struct MovementReportQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// GET /analytics/equipamentos — counts per status
pub async fn equipment_report(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EquipmentReport>, ApiError> {
    let report = state
        .analytics()
        .equipment_report()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to build equipment report: {e}")))?;

    Ok(Json(report))
}

/// GET /analytics/movimentacoes — totals per type plus a per-day series
pub async fn movement_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MovementReportQuery>,
) -> Result<Json<MovementReport>, ApiError> {
    let mut details = vec![];
    let from = validation::optional_range_bound(&mut details, "from", query.from.as_deref(), false);
    let to = validation::optional_range_bound(&mut details, "to", query.to.as_deref(), true);

    if !details.is_empty() {
        return Err(ApiError::validation(details));
    }

    let report = state
        .analytics()
        .movement_report(from, to)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to build movement report: {e}")))?;

    Ok(Json(report))
}
