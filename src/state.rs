use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::driver::Driver;
use crate::models::shipment::Shipment;
use crate::models::vehicle::Vehicle;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub drivers: DashMap<Uuid, Driver>,
    pub vehicles: DashMap<Uuid, Vehicle>,
    pub shipments: DashMap<Uuid, Shipment>,
    /// Tracking number -> shipment id; the uniqueness authority for tracking ids.
    pub tracking_index: DashMap<String, Uuid>,
    /// Serializes mutations so multi-entity updates never interleave.
    pub write_lock: Mutex<()>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            drivers: DashMap::new(),
            vehicles: DashMap::new(),
            shipments: DashMap::new(),
            tracking_index: DashMap::new(),
            write_lock: Mutex::new(()),
            metrics: Metrics::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
