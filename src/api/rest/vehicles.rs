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
use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/vehicles", get(list_vehicles).post(create_vehicle))
        .route(
            "/vehicles/:id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
        .route("/vehicles/status/:status", get(list_vehicles_by_status))
        .route("/vehicles/:id/status", patch(update_vehicle_status))
}

#[derive(Deserialize)]
pub struct VehicleProfileRequest {
    pub registration_number: String,
    pub vehicle_type: String,
    pub model: String,
    pub capacity: f64,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: VehicleStatus,
}

async fn create_vehicle(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VehicleProfileRequest>,
) -> Result<Json<Vehicle>, AppError> {
    validate_profile(&payload)?;

    let _guard = state.write_lock.lock().await;

    if registration_taken(&state, &payload.registration_number, None) {
        return Err(AppError::Conflict(format!(
            "registration number {} is already registered",
            payload.registration_number
        )));
    }

    let vehicle = Vehicle {
        id: Uuid::new_v4(),
        registration_number: payload.registration_number,
        vehicle_type: payload.vehicle_type,
        model: payload.model,
        capacity: payload.capacity,
        status: VehicleStatus::Available,
        created_at: Utc::now(),
    };

    state.vehicles.insert(vehicle.id, vehicle.clone());
    Ok(Json(vehicle))
}

async fn list_vehicles(State(state): State<Arc<AppState>>) -> Json<Vec<Vehicle>> {
    let vehicles = state
        .vehicles
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(vehicles)
}

async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, AppError> {
    let vehicle = state
        .vehicles
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("vehicle {id} not found")))?;

    Ok(Json(vehicle.value().clone()))
}

async fn list_vehicles_by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<VehicleStatus>,
) -> Json<Vec<Vehicle>> {
    let vehicles = state
        .vehicles
        .iter()
        .filter(|entry| entry.value().status == status)
        .map(|entry| entry.value().clone())
        .collect();
    Json(vehicles)
}

async fn update_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VehicleProfileRequest>,
) -> Result<Json<Vehicle>, AppError> {
    validate_profile(&payload)?;

    let _guard = state.write_lock.lock().await;

    if registration_taken(&state, &payload.registration_number, Some(id)) {
        return Err(AppError::Conflict(format!(
            "registration number {} is already registered",
            payload.registration_number
        )));
    }

    let mut vehicle = state
        .vehicles
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("vehicle {id} not found")))?;

    vehicle.registration_number = payload.registration_number;
    vehicle.vehicle_type = payload.vehicle_type;
    vehicle.model = payload.model;
    vehicle.capacity = payload.capacity;

    Ok(Json(vehicle.clone()))
}

async fn update_vehicle_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Vehicle>, AppError> {
    let vehicle = resources::set_vehicle_status(&state, id, payload.status).await?;
    Ok(Json(vehicle))
}

async fn delete_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    resources::delete_vehicle(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn validate_profile(payload: &VehicleProfileRequest) -> Result<(), AppError> {
    if payload.registration_number.trim().is_empty() {
        return Err(AppError::Validation(
            "registration number cannot be empty".to_string(),
        ));
    }
    if payload.vehicle_type.trim().is_empty() {
        return Err(AppError::Validation(
            "vehicle type cannot be empty".to_string(),
        ));
    }
    if payload.model.trim().is_empty() {
        return Err(AppError::Validation("model cannot be empty".to_string()));
    }
    if payload.capacity <= 0.0 {
        return Err(AppError::Validation("capacity must be > 0".to_string()));
    }
    Ok(())
}

fn registration_taken(state: &AppState, registration_number: &str, except: Option<Uuid>) -> bool {
    state.vehicles.iter().any(|entry| {
        let vehicle = entry.value();
        vehicle.registration_number == registration_number && Some(vehicle.id) != except
    })
}
