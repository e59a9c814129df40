use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use motel_core::{CashMovement, MovementType};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MovementRequest {
    #[serde(rename = "type", alias = "movement_type")]
    movement_type: MovementType,
    concept: String,
    /// Cents, strictly positive.
    amount: i64,
}

/// Posts a movement to the open till.
pub async fn record_movement(
    State(state): State<AppState>,
    payload: Result<Json<MovementRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CashMovement>)> {
    let Json(request) = payload?;
    let movement = state
        .tills()
        .record_movement(request.movement_type, &request.concept, request.amount)
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}
