//! # Routes
//!
//! HTTP handlers. Money is always integer cents.
//!
//! ```text
//! GET        /health
//! GET/POST   /employees                     GET/POST  /shifts
//! GET/POST   /rooms                         GET/PATCH /rooms/{number}
//! GET        /rooms/{number}/occupation_time
//! GET        /rooms/{number}/last_payment
//! GET        /rooms/{number}/last_vehicle_info
//! GET        /rooms/{number}/renewal_details?vehicle_info=
//! GET        /rooms/{number}/history
//! GET        /rooms/{number}/payments
//! POST       /tills                         GET  /tills/current
//! GET        /tills/current/movements       GET  /tills/current/report
//! GET        /tills/last_report             GET  /tills/{id}/balance
//! POST       /tills/{id}/close
//! POST       /movements
//! ```

mod health;
mod movements;
mod rooms;
mod staff;
mod tills;

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tracing::info;
use uuid::Uuid;

use crate::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/employees", get(staff::list_employees).post(staff::create_employee))
        .route("/shifts", get(staff::list_shifts).post(staff::create_shift))
        .route("/rooms", get(rooms::list_rooms).post(rooms::create_room))
        .route("/rooms/{number}", get(rooms::get_room).patch(rooms::update_room))
        .route("/rooms/{number}/occupation_time", get(rooms::occupation_time))
        .route("/rooms/{number}/last_payment", get(rooms::last_payment))
        .route("/rooms/{number}/last_vehicle_info", get(rooms::last_vehicle_info))
        .route("/rooms/{number}/renewal_details", get(rooms::renewal_details))
        .route("/rooms/{number}/history", get(rooms::history))
        .route("/rooms/{number}/payments", get(rooms::payments))
        .route("/tills", post(tills::open_till))
        .route("/tills/current", get(tills::current_till))
        .route("/tills/current/movements", get(tills::current_movements))
        .route("/tills/current/report", get(tills::current_report))
        .route("/tills/last_report", get(tills::last_report))
        .route("/tills/{id}/balance", get(tills::balance))
        .route("/tills/{id}/close", post(tills::close_till))
        .route("/movements", post(movements::record_movement))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Logs every request with a correlation id.
async fn log_request(request: Request, next: Next) -> Response {
    let correlation_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        correlation_id = %correlation_id,
        %method,
        path = %path,
        status = response.status().as_u16(),
        duration_us = started.elapsed().as_micros() as u64,
        "Request handled"
    );
    response
}
