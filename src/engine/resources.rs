use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::driver::{Driver, DriverStatus};
use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::state::AppState;

/// Flips an AVAILABLE driver to BUSY. The status check and the write happen
/// under the entry's exclusive reference, so two racing claims cannot both win.
pub(crate) fn claim_driver(state: &AppState, id: Uuid) -> Result<(), AppError> {
    let mut driver = state
        .drivers
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("driver {id} not found")))?;

    if driver.status != DriverStatus::Available {
        return Err(AppError::ResourceUnavailable(format!(
            "driver {id} is not available"
        )));
    }

    driver.status = DriverStatus::Busy;
    Ok(())
}

/// A BUSY driver goes back to AVAILABLE; an operator's OFF_DUTY stands.
pub(crate) fn release_driver(state: &AppState, id: Uuid) {
    if let Some(mut driver) = state.drivers.get_mut(&id) {
        if driver.status == DriverStatus::Busy {
            driver.status = DriverStatus::Available;
        }
    }
}

/// Re-marks a driver BUSY after an aborted release-then-acquire.
pub(crate) fn restore_driver(state: &AppState, id: Uuid) {
    if let Some(mut driver) = state.drivers.get_mut(&id) {
        driver.status = DriverStatus::Busy;
    }
}

pub(crate) fn claim_vehicle(state: &AppState, id: Uuid) -> Result<(), AppError> {
    let mut vehicle = state
        .vehicles
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("vehicle {id} not found")))?;

    if vehicle.status != VehicleStatus::Available {
        return Err(AppError::ResourceUnavailable(format!(
            "vehicle {id} is not available"
        )));
    }

    vehicle.status = VehicleStatus::Busy;
    Ok(())
}

pub(crate) fn release_vehicle(state: &AppState, id: Uuid) {
    if let Some(mut vehicle) = state.vehicles.get_mut(&id) {
        if vehicle.status == VehicleStatus::Busy {
            vehicle.status = VehicleStatus::Available;
        }
    }
}

pub(crate) fn restore_vehicle(state: &AppState, id: Uuid) {
    if let Some(mut vehicle) = state.vehicles.get_mut(&id) {
        vehicle.status = VehicleStatus::Busy;
    }
}

/// Operator duty toggle. BUSY is owned by the engine: it can never be set
/// directly, and a driver held by an active shipment cannot change duty.
pub async fn set_driver_status(
    state: &AppState,
    id: Uuid,
    requested: DriverStatus,
) -> Result<Driver, AppError> {
    if requested == DriverStatus::Busy {
        return Err(AppError::Validation(
            "BUSY is set by assignment; assign the driver to a shipment instead".to_string(),
        ));
    }

    let _guard = state.write_lock.lock().await;

    let mut driver = state
        .drivers
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("driver {id} not found")))?;

    if driver.status == DriverStatus::Busy {
        return Err(AppError::Conflict(format!(
            "driver {id} is assigned to an active shipment"
        )));
    }

    driver.status = requested;
    info!(driver_id = %id, status = requested.as_str(), "driver duty status changed");

    Ok(driver.clone())
}

pub async fn set_vehicle_status(
    state: &AppState,
    id: Uuid,
    requested: VehicleStatus,
) -> Result<Vehicle, AppError> {
    if requested == VehicleStatus::Busy {
        return Err(AppError::Validation(
            "BUSY is set by assignment; assign the vehicle to a shipment instead".to_string(),
        ));
    }

    let _guard = state.write_lock.lock().await;

    let mut vehicle = state
        .vehicles
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("vehicle {id} not found")))?;

    if vehicle.status == VehicleStatus::Busy {
        return Err(AppError::Conflict(format!(
            "vehicle {id} is assigned to an active shipment"
        )));
    }

    vehicle.status = requested;
    info!(vehicle_id = %id, status = requested.as_str(), "vehicle duty status changed");

    Ok(vehicle.clone())
}

pub async fn delete_driver(state: &AppState, id: Uuid) -> Result<(), AppError> {
    let _guard = state.write_lock.lock().await;

    let status = state
        .drivers
        .get(&id)
        .map(|entry| entry.status)
        .ok_or_else(|| AppError::NotFound(format!("driver {id} not found")))?;

    if status == DriverStatus::Busy {
        return Err(AppError::Conflict(format!(
            "driver {id} is assigned to an active shipment"
        )));
    }

    state.drivers.remove(&id);
    info!(driver_id = %id, "driver deleted");
    Ok(())
}

pub async fn delete_vehicle(state: &AppState, id: Uuid) -> Result<(), AppError> {
    let _guard = state.write_lock.lock().await;

    let status = state
        .vehicles
        .get(&id)
        .map(|entry| entry.status)
        .ok_or_else(|| AppError::NotFound(format!("vehicle {id} not found")))?;

    if status == VehicleStatus::Busy {
        return Err(AppError::Conflict(format!(
            "vehicle {id} is assigned to an active shipment"
        )));
    }

    state.vehicles.remove(&id);
    info!(vehicle_id = %id, "vehicle deleted");
    Ok(())
}
