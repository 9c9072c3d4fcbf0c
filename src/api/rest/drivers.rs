use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::resources;
use crate::error::AppError;
use crate::models::driver::{Driver, DriverStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drivers", get(list_drivers).post(create_driver))
        .route(
            "/drivers/:id",
            get(get_driver).put(update_driver).delete(delete_driver),
        )
        .route("/drivers/status/:status", get(list_drivers_by_status))
        .route("/drivers/:id/status", patch(update_driver_status))
}

#[derive(Deserialize)]
pub struct DriverProfileRequest {
    pub name: String,
    pub license_number: String,
    pub phone: String,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: DriverStatus,
}

async fn create_driver(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DriverProfileRequest>,
) -> Result<Json<Driver>, AppError> {
    validate_profile(&payload)?;

    let _guard = state.write_lock.lock().await;

    if license_taken(&state, &payload.license_number, None) {
        return Err(AppError::Conflict(format!(
            "license number {} is already registered",
            payload.license_number
        )));
    }

    let driver = Driver {
        id: Uuid::new_v4(),
        name: payload.name,
        license_number: payload.license_number,
        phone: payload.phone,
        status: DriverStatus::Available,
        created_at: Utc::now(),
    };

    state.drivers.insert(driver.id, driver.clone());
    Ok(Json(driver))
}

async fn list_drivers(State(state): State<Arc<AppState>>) -> Json<Vec<Driver>> {
    let drivers = state
        .drivers
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(drivers)
}

async fn get_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Driver>, AppError> {
    let driver = state
        .drivers
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("driver {id} not found")))?;

    Ok(Json(driver.value().clone()))
}

async fn list_drivers_by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<DriverStatus>,
) -> Json<Vec<Driver>> {
    let drivers = state
        .drivers
        .iter()
        .filter(|entry| entry.value().status == status)
        .map(|entry| entry.value().clone())
        .collect();
    Json(drivers)
}

/// Profile edit only; availability is owned by the assignment engine and is
/// not part of the request shape.
async fn update_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DriverProfileRequest>,
) -> Result<Json<Driver>, AppError> {
    validate_profile(&payload)?;

    let _guard = state.write_lock.lock().await;

    if license_taken(&state, &payload.license_number, Some(id)) {
        return Err(AppError::Conflict(format!(
            "license number {} is already registered",
            payload.license_number
        )));
    }

    let mut driver = state
        .drivers
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("driver {id} not found")))?;

    driver.name = payload.name;
    driver.license_number = payload.license_number;
    driver.phone = payload.phone;

    Ok(Json(driver.clone()))
}

async fn update_driver_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Driver>, AppError> {
    let driver = resources::set_driver_status(&state, id, payload.status).await?;
    Ok(Json(driver))
}

async fn delete_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    resources::delete_driver(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn validate_profile(payload: &DriverProfileRequest) -> Result<(), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if payload.license_number.trim().is_empty() {
        return Err(AppError::Validation(
            "license number cannot be empty".to_string(),
        ));
    }
    if payload.phone.trim().is_empty() {
        return Err(AppError::Validation("phone cannot be empty".to_string()));
    }
    Ok(())
}

fn license_taken(state: &AppState, license_number: &str, except: Option<Uuid>) -> bool {
    state.drivers.iter().any(|entry| {
        let driver = entry.value();
        driver.license_number == license_number && Some(driver.id) != except
    })
}
