use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::assignment::{self, NewShipment};
use crate::error::AppError;
use crate::models::shipment::{Shipment, ShipmentStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/shipments", get(list_shipments).post(create_shipment))
        .route(
            "/shipments/:id",
            get(get_shipment).put(update_shipment).delete(delete_shipment),
        )
        .route("/shipments/status/:status", get(list_shipments_by_status))
        .route(
            "/shipments/tracking/:tracking_number",
            get(get_by_tracking_number),
        )
        .route("/shipments/customer/:customer_ref", get(list_by_customer))
        .route("/shipments/:id/assign", post(assign_resources))
        .route("/shipments/:id/transition", post(transition_status))
}

#[derive(Deserialize)]
pub struct CreateShipmentRequest {
    pub customer_ref: String,
    pub origin: String,
    pub destination: String,
    pub weight: Option<f64>,
    pub description: Option<String>,
    pub tracking_number: Option<String>,
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
}

/// Profile fields only. Status, assignment and tracking number are not part
/// of the shape, so they cannot be changed through a field-level update.
#[derive(Deserialize)]
pub struct UpdateShipmentRequest {
    pub customer_ref: String,
    pub origin: String,
    pub destination: String,
    pub weight: Option<f64>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct AssignRequest {
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct TransitionRequest {
    pub status: ShipmentStatus,
}

async fn create_shipment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateShipmentRequest>,
) -> Result<Json<Shipment>, AppError> {
    let shipment = assignment::create_shipment(
        &state,
        NewShipment {
            customer_ref: payload.customer_ref,
            origin: payload.origin,
            destination: payload.destination,
            weight: payload.weight,
            description: payload.description,
            tracking_number: payload.tracking_number,
            driver_id: payload.driver_id,
            vehicle_id: payload.vehicle_id,
        },
    )
    .await?;

    Ok(Json(shipment))
}

async fn list_shipments(State(state): State<Arc<AppState>>) -> Json<Vec<Shipment>> {
    let shipments = state
        .shipments
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(shipments)
}

async fn get_shipment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Shipment>, AppError> {
    let shipment = state
        .shipments
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("shipment {id} not found")))?;

    Ok(Json(shipment.value().clone()))
}

async fn list_shipments_by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<ShipmentStatus>,
) -> Json<Vec<Shipment>> {
    let shipments = state
        .shipments
        .iter()
        .filter(|entry| entry.value().status == status)
        .map(|entry| entry.value().clone())
        .collect();
    Json(shipments)
}

async fn get_by_tracking_number(
    State(state): State<Arc<AppState>>,
    Path(tracking_number): Path<String>,
) -> Result<Json<Shipment>, AppError> {
    let shipment_id = state
        .tracking_index
        .get(&tracking_number)
        .map(|entry| *entry.value())
        .ok_or_else(|| AppError::NotFound(format!("shipment {tracking_number} not found")))?;

    let shipment = state
        .shipments
        .get(&shipment_id)
        .ok_or_else(|| AppError::NotFound(format!("shipment {tracking_number} not found")))?;

    Ok(Json(shipment.value().clone()))
}

async fn list_by_customer(
    State(state): State<Arc<AppState>>,
    Path(customer_ref): Path<String>,
) -> Json<Vec<Shipment>> {
    let shipments = state
        .shipments
        .iter()
        .filter(|entry| entry.value().customer_ref == customer_ref)
        .map(|entry| entry.value().clone())
        .collect();
    Json(shipments)
}

async fn update_shipment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateShipmentRequest>,
) -> Result<Json<Shipment>, AppError> {
    if payload.customer_ref.trim().is_empty() {
        return Err(AppError::Validation(
            "customer reference is required".to_string(),
        ));
    }
    if payload.origin.trim().is_empty() {
        return Err(AppError::Validation("origin is required".to_string()));
    }
    if payload.destination.trim().is_empty() {
        return Err(AppError::Validation("destination is required".to_string()));
    }
    if payload.weight.is_some_and(|w| w < 0.0) {
        return Err(AppError::Validation(
            "weight cannot be negative".to_string(),
        ));
    }

    let _guard = state.write_lock.lock().await;

    let mut shipment = state
        .shipments
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("shipment {id} not found")))?;

    shipment.customer_ref = payload.customer_ref;
    shipment.origin = payload.origin;
    shipment.destination = payload.destination;
    shipment.weight = payload.weight;
    shipment.description = payload.description;
    shipment.updated_at = Utc::now();

    Ok(Json(shipment.clone()))
}

async fn assign_resources(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignRequest>,
) -> Result<Json<Shipment>, AppError> {
    let shipment = assignment::assign(&state, id, payload.driver_id, payload.vehicle_id).await?;
    Ok(Json(shipment))
}

async fn transition_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionRequest>,
) -> Result<Json<Shipment>, AppError> {
    let shipment = assignment::transition(&state, id, payload.status).await?;
    Ok(Json(shipment))
}

async fn delete_shipment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    assignment::delete_shipment(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
