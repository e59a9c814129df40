//! Till handlers: handover, close, balance and reports.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use motel_core::report::TurnReport;
use motel_core::till::TillSummary;
use motel_core::{CashMovement, Till};

use crate::error::ApiResult;
use crate::services::{Handover, TillClosure};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OpenTillRequest {
    employee_id: i64,
    #[serde(default)]
    opening_amount: i64,
    #[serde(default)]
    description: Option<String>,
}

/// Closes the open till (if any) and opens a new one.
pub async fn open_till(
    State(state): State<AppState>,
    payload: Result<Json<OpenTillRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Handover>)> {
    let Json(request) = payload?;
    let handover = state
        .tills()
        .open_till(
            request.employee_id,
            request.opening_amount,
            request.description.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(handover)))
}

pub async fn current_till(State(state): State<AppState>) -> ApiResult<Json<Till>> {
    Ok(Json(state.tills().current_till().await?))
}

pub async fn current_movements(State(state): State<AppState>) -> ApiResult<Json<Vec<CashMovement>>> {
    Ok(Json(state.tills().current_movements().await?))
}

/// Document download for the open till. Does not close it.
pub async fn current_report(State(state): State<AppState>) -> ApiResult<Response> {
    let document = state.tills().export_current_report().await?;
    let disposition = format!("attachment; filename=\"{}\"", document.filename);
    Ok((
        [
            (header::CONTENT_TYPE, document.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response())
}

pub async fn last_report(State(state): State<AppState>) -> ApiResult<Json<TurnReport>> {
    Ok(Json(state.tills().last_report().await?))
}

pub async fn balance(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TillSummary>> {
    Ok(Json(state.tills().summary(id).await?))
}

pub async fn close_till(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TillClosure>> {
    Ok(Json(state.tills().close_till(id).await?))
}
