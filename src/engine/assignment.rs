use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::engine::{resources, tracking};
use crate::error::AppError;
use crate::models::driver::DriverStatus;
use crate::models::shipment::{Shipment, ShipmentStatus};
use crate::models::vehicle::VehicleStatus;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct NewShipment {
    pub customer_ref: String,
    pub origin: String,
    pub destination: String,
    pub weight: Option<f64>,
    pub description: Option<String>,
    pub tracking_number: Option<String>,
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
}

pub async fn create_shipment(state: &AppState, new: NewShipment) -> Result<Shipment, AppError> {
    validate_new_shipment(&new)?;

    let _guard = state.write_lock.lock().await;

    let id = Uuid::new_v4();
    let tracking_number = tracking::reserve(state, new.tracking_number.clone(), id)?;

    if let Some(driver_id) = new.driver_id {
        if let Err(err) = resources::claim_driver(state, driver_id) {
            tracking::release(state, &tracking_number);
            return Err(err);
        }
    }

    if let Some(vehicle_id) = new.vehicle_id {
        if let Err(err) = resources::claim_vehicle(state, vehicle_id) {
            // Creation must not leave partial state behind.
            if let Some(driver_id) = new.driver_id {
                resources::release_driver(state, driver_id);
            }
            tracking::release(state, &tracking_number);
            return Err(err);
        }
    }

    let now = Utc::now();
    let shipment = Shipment {
        id,
        tracking_number,
        customer_ref: new.customer_ref,
        driver_id: new.driver_id,
        vehicle_id: new.vehicle_id,
        origin: new.origin,
        destination: new.destination,
        status: ShipmentStatus::Pending,
        weight: new.weight,
        description: new.description,
        created_at: now,
        updated_at: now,
    };

    state.shipments.insert(shipment.id, shipment.clone());
    state
        .metrics
        .shipments_by_status
        .with_label_values(&[shipment.status.as_str()])
        .inc();

    info!(
        shipment_id = %shipment.id,
        tracking_number = %shipment.tracking_number,
        "shipment created"
    );

    Ok(shipment)
}

fn validate_new_shipment(new: &NewShipment) -> Result<(), AppError> {
    if new.customer_ref.trim().is_empty() {
        return Err(AppError::Validation(
            "customer reference is required".to_string(),
        ));
    }
    if new.origin.trim().is_empty() {
        return Err(AppError::Validation("origin is required".to_string()));
    }
    if new.destination.trim().is_empty() {
        return Err(AppError::Validation("destination is required".to_string()));
    }
    if new.weight.is_some_and(|w| w < 0.0) {
        return Err(AppError::Validation(
            "weight cannot be negative".to_string(),
        ));
    }
    Ok(())
}

pub async fn assign(
    state: &AppState,
    shipment_id: Uuid,
    driver_id: Option<Uuid>,
    vehicle_id: Option<Uuid>,
) -> Result<Shipment, AppError> {
    let result = apply_assignment(state, shipment_id, driver_id, vehicle_id).await;

    let outcome = if result.is_ok() { "success" } else { "rejected" };
    state
        .metrics
        .assignments_total
        .with_label_values(&[outcome])
        .inc();

    result
}

async fn apply_assignment(
    state: &AppState,
    shipment_id: Uuid,
    driver_id: Option<Uuid>,
    vehicle_id: Option<Uuid>,
) -> Result<Shipment, AppError> {
    if driver_id.is_none() && vehicle_id.is_none() {
        return Err(AppError::Validation(
            "a driver id or a vehicle id is required".to_string(),
        ));
    }

    let _guard = state.write_lock.lock().await;

    let (status, previous_driver, previous_vehicle) = {
        let shipment = state
            .shipments
            .get(&shipment_id)
            .ok_or_else(|| AppError::NotFound(format!("shipment {shipment_id} not found")))?;
        (shipment.status, shipment.driver_id, shipment.vehicle_id)
    };

    if status.is_terminal() {
        return Err(AppError::TerminalState(format!(
            "shipment {shipment_id} is {} and cannot be reassigned",
            status.as_str()
        )));
    }

    // Validate both targets before mutating anything.
    if let Some(id) = driver_id {
        ensure_driver_assignable(state, id, previous_driver)?;
    }
    if let Some(id) = vehicle_id {
        ensure_vehicle_assignable(state, id, previous_vehicle)?;
    }

    let driver_swapped = match driver_id {
        Some(new) => swap_driver(state, previous_driver, new)?,
        None => false,
    };

    if let Some(new) = vehicle_id {
        if let Err(err) = swap_vehicle(state, previous_vehicle, new) {
            // The vehicle leg failed; put the driver leg back as it was.
            if driver_swapped {
                if let Some(new_driver) = driver_id {
                    resources::release_driver(state, new_driver);
                }
                if let Some(old_driver) = previous_driver {
                    resources::restore_driver(state, old_driver);
                }
            }
            return Err(err);
        }
    }

    let mut shipment = state
        .shipments
        .get_mut(&shipment_id)
        .ok_or_else(|| AppError::NotFound(format!("shipment {shipment_id} not found")))?;

    if let Some(id) = driver_id {
        shipment.driver_id = Some(id);
    }
    if let Some(id) = vehicle_id {
        shipment.vehicle_id = Some(id);
    }
    shipment.updated_at = Utc::now();

    info!(
        shipment_id = %shipment.id,
        driver_id = ?driver_id,
        vehicle_id = ?vehicle_id,
        "shipment resources assigned"
    );

    Ok(shipment.clone())
}

fn ensure_driver_assignable(
    state: &AppState,
    id: Uuid,
    previous: Option<Uuid>,
) -> Result<(), AppError> {
    let driver = state
        .drivers
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("driver {id} not found")))?;

    // Re-assigning the shipment's own driver is a no-op, not a conflict.
    if previous == Some(id) {
        return Ok(());
    }

    if driver.status != DriverStatus::Available {
        return Err(AppError::ResourceUnavailable(format!(
            "driver {id} is not available"
        )));
    }

    Ok(())
}

fn ensure_vehicle_assignable(
    state: &AppState,
    id: Uuid,
    previous: Option<Uuid>,
) -> Result<(), AppError> {
    let vehicle = state
        .vehicles
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("vehicle {id} not found")))?;

    if previous == Some(id) {
        return Ok(());
    }

    if vehicle.status != VehicleStatus::Available {
        return Err(AppError::ResourceUnavailable(format!(
            "vehicle {id} is not available"
        )));
    }

    Ok(())
}

/// Release-then-acquire: the old claim is freed before the new one is taken,
/// and restored if the new claim fails. Returns whether a swap happened.
fn swap_driver(state: &AppState, previous: Option<Uuid>, new: Uuid) -> Result<bool, AppError> {
    if previous == Some(new) {
        return Ok(false);
    }

    if let Some(old) = previous {
        resources::release_driver(state, old);
    }

    match resources::claim_driver(state, new) {
        Ok(()) => Ok(true),
        Err(err) => {
            if let Some(old) = previous {
                resources::restore_driver(state, old);
            }
            Err(err)
        }
    }
}

fn swap_vehicle(state: &AppState, previous: Option<Uuid>, new: Uuid) -> Result<bool, AppError> {
    if previous == Some(new) {
        return Ok(false);
    }

    if let Some(old) = previous {
        resources::release_vehicle(state, old);
    }

    match resources::claim_vehicle(state, new) {
        Ok(()) => Ok(true),
        Err(err) => {
            if let Some(old) = previous {
                resources::restore_vehicle(state, old);
            }
            Err(err)
        }
    }
}

pub async fn transition(
    state: &AppState,
    shipment_id: Uuid,
    next: ShipmentStatus,
) -> Result<Shipment, AppError> {
    let _guard = state.write_lock.lock().await;

    let mut shipment = state
        .shipments
        .get_mut(&shipment_id)
        .ok_or_else(|| AppError::NotFound(format!("shipment {shipment_id} not found")))?;

    let current = shipment.status;
    if !current.can_transition_to(next) {
        return Err(AppError::InvalidTransition(format!(
            "shipment {shipment_id} cannot move from {} to {}",
            current.as_str(),
            next.as_str()
        )));
    }

    shipment.status = next;
    shipment.updated_at = Utc::now();

    // Entering a terminal state frees the crew in the same critical section
    // as the status write.
    if next.is_terminal() {
        if let Some(driver_id) = shipment.driver_id {
            resources::release_driver(state, driver_id);
        }
        if let Some(vehicle_id) = shipment.vehicle_id {
            resources::release_vehicle(state, vehicle_id);
        }
    }

    state
        .metrics
        .shipments_by_status
        .with_label_values(&[current.as_str()])
        .dec();
    state
        .metrics
        .shipments_by_status
        .with_label_values(&[next.as_str()])
        .inc();
    state
        .metrics
        .transitions_total
        .with_label_values(&[next.as_str()])
        .inc();

    info!(
        shipment_id = %shipment.id,
        from = current.as_str(),
        to = next.as_str(),
        "shipment status changed"
    );

    Ok(shipment.clone())
}

pub async fn delete_shipment(state: &AppState, shipment_id: Uuid) -> Result<(), AppError> {
    let _guard = state.write_lock.lock().await;

    let shipment = state
        .shipments
        .get(&shipment_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("shipment {shipment_id} not found")))?;

    // Release-then-remove, but only for a live shipment: a terminal one gave
    // its resources back already, and they may be claimed elsewhere by now.
    if !shipment.status.is_terminal() {
        if let Some(driver_id) = shipment.driver_id {
            resources::release_driver(state, driver_id);
        }
        if let Some(vehicle_id) = shipment.vehicle_id {
            resources::release_vehicle(state, vehicle_id);
        }
    }

    state.shipments.remove(&shipment_id);
    tracking::release(state, &shipment.tracking_number);
    state
        .metrics
        .shipments_by_status
        .with_label_values(&[shipment.status.as_str()])
        .dec();

    info!(shipment_id = %shipment_id, "shipment deleted");
    Ok(())
}
