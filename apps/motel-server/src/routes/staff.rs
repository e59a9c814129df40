//! Employee and shift reference data.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use motel_core::{Employee, NewEmployee, NewShift, Shift};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_employees(State(state): State<AppState>) -> ApiResult<Json<Vec<Employee>>> {
    Ok(Json(state.db().employees().list().await?))
}

pub async fn create_employee(
    State(state): State<AppState>,
    payload: Result<Json<NewEmployee>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    let Json(new_employee) = payload?;
    let employee = state.db().employees().create(&new_employee).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn list_shifts(State(state): State<AppState>) -> ApiResult<Json<Vec<Shift>>> {
    Ok(Json(state.db().employees().list_shifts().await?))
}

pub async fn create_shift(
    State(state): State<AppState>,
    payload: Result<Json<NewShift>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Shift>)> {
    let Json(new_shift) = payload?;
    let shift = state.db().employees().create_shift(&new_shift).await?;
    Ok((StatusCode::CREATED, Json(shift)))
}
