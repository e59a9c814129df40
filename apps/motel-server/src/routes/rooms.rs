//! Room handlers: registration, the transition dispatcher and the
//! occupation reads.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use motel_core::occupancy::OccupationSnapshot;
use motel_core::{NewRoom, Payment, Room, RoomHistory};

use crate::error::ApiResult;
use crate::services::{RenewalDetails, RoomPatch, RoomUpdate};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RenewalQuery {
    #[serde(default)]
    vehicle_info: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VehicleInfoResponse {
    room_number: i64,
    vehicle_info: String,
}

pub async fn list_rooms(State(state): State<AppState>) -> ApiResult<Json<Vec<Room>>> {
    Ok(Json(state.occupancy().list_rooms().await?))
}

pub async fn create_room(
    State(state): State<AppState>,
    payload: Result<Json<NewRoom>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Room>)> {
    let Json(new_room) = payload?;
    let room = state.occupancy().create_room(&new_room).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn get_room(
    State(state): State<AppState>,
    Path(number): Path<i64>,
) -> ApiResult<Json<Room>> {
    Ok(Json(state.occupancy().room(number).await?))
}

/// Status change, occupation, renewal or rent price update.
pub async fn update_room(
    State(state): State<AppState>,
    Path(number): Path<i64>,
    payload: Result<Json<RoomPatch>, JsonRejection>,
) -> ApiResult<Json<RoomUpdate>> {
    let Json(patch) = payload?;
    Ok(Json(state.occupancy().update_room(number, patch).await?))
}

pub async fn occupation_time(
    State(state): State<AppState>,
    Path(number): Path<i64>,
) -> ApiResult<Json<OccupationSnapshot>> {
    Ok(Json(state.occupancy().occupation_snapshot(number).await?))
}

pub async fn last_payment(
    State(state): State<AppState>,
    Path(number): Path<i64>,
) -> ApiResult<Json<Payment>> {
    Ok(Json(state.occupancy().last_payment(number).await?))
}

pub async fn last_vehicle_info(
    State(state): State<AppState>,
    Path(number): Path<i64>,
) -> ApiResult<Json<VehicleInfoResponse>> {
    let vehicle_info = state.occupancy().last_vehicle_info(number).await?;
    Ok(Json(VehicleInfoResponse {
        room_number: number,
        vehicle_info,
    }))
}

pub async fn renewal_details(
    State(state): State<AppState>,
    Path(number): Path<i64>,
    query: Result<Query<RenewalQuery>, QueryRejection>,
) -> ApiResult<Json<RenewalDetails>> {
    let Query(query) = query?;
    let details = state
        .occupancy()
        .renewal_window(number, query.vehicle_info.as_deref())
        .await?;
    Ok(Json(details))
}

pub async fn history(
    State(state): State<AppState>,
    Path(number): Path<i64>,
) -> ApiResult<Json<Vec<RoomHistory>>> {
    Ok(Json(state.occupancy().room_history(number).await?))
}

pub async fn payments(
    State(state): State<AppState>,
    Path(number): Path<i64>,
) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(state.occupancy().payments(number).await?))
}
