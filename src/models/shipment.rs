use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    Pending,
    InTransit,
    Delivered,
    Cancelled,
}

impl ShipmentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ShipmentStatus::Delivered | ShipmentStatus::Cancelled)
    }

    /// The complete set of legal lifecycle moves; anything else is rejected.
    pub fn can_transition_to(self, next: ShipmentStatus) -> bool {
        use ShipmentStatus::*;

        matches!(
            (self, next),
            (Pending, InTransit) | (Pending, Cancelled) | (InTransit, Delivered) | (InTransit, Cancelled)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "PENDING",
            ShipmentStatus::InTransit => "IN_TRANSIT",
            ShipmentStatus::Delivered => "DELIVERED",
            ShipmentStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: Uuid,
    pub tracking_number: String,
    pub customer_ref: String,
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub origin: String,
    pub destination: String,
    pub status: ShipmentStatus,
    pub weight: Option<f64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::ShipmentStatus::*;

    #[test]
    fn pending_moves_to_in_transit_or_cancelled() {
        assert!(Pending.can_transition_to(InTransit));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn in_transit_completes_or_cancels() {
        assert!(InTransit.can_transition_to(Delivered));
        assert!(InTransit.can_transition_to(Cancelled));
        assert!(!InTransit.can_transition_to(Pending));
        assert!(!InTransit.can_transition_to(InTransit));
    }

    #[test]
    fn terminal_states_allow_no_moves() {
        for terminal in [Delivered, Cancelled] {
            assert!(terminal.is_terminal());
            for next in [Pending, InTransit, Delivered, Cancelled] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }
}
