use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

const MAX_GENERATE_ATTEMPTS: u32 = 5;

/// `TRK-` followed by 8 uppercase hex chars from the front of a random
/// 128-bit id. The store, not this function, is the uniqueness authority.
pub fn generate() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("TRK-{}", hex[..8].to_uppercase())
}

/// Reserves a tracking number in the index. A caller-supplied number that is
/// already taken is a conflict; a generated one retries with a fresh id up to
/// a bounded attempt count.
pub fn reserve(
    state: &AppState,
    requested: Option<String>,
    shipment_id: Uuid,
) -> Result<String, AppError> {
    if let Some(number) = requested {
        return match state.tracking_index.entry(number.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "tracking number {number} is already in use"
            ))),
            Entry::Vacant(slot) => {
                slot.insert(shipment_id);
                Ok(number)
            }
        };
    }

    for _ in 0..MAX_GENERATE_ATTEMPTS {
        let number = generate();
        match state.tracking_index.entry(number.clone()) {
            Entry::Occupied(_) => {
                state.metrics.tracking_collisions_total.inc();
            }
            Entry::Vacant(slot) => {
                slot.insert(shipment_id);
                return Ok(number);
            }
        }
    }

    Err(AppError::Conflict(format!(
        "no unique tracking number after {MAX_GENERATE_ATTEMPTS} attempts"
    )))
}

pub fn release(state: &AppState, number: &str) {
    state.tracking_index.remove(number);
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{generate, reserve};
    use crate::state::AppState;

    fn is_well_formed(number: &str) -> bool {
        match number.strip_prefix("TRK-") {
            Some(hex) => hex.len() == 8 && hex.chars().all(|c| matches!(c, '0'..='9' | 'A'..='F')),
            None => false,
        }
    }

    #[test]
    fn generated_numbers_match_the_pattern() {
        for _ in 0..1_000 {
            let number = generate();
            assert!(is_well_formed(&number), "bad tracking number: {number}");
        }
    }

    #[test]
    fn ten_thousand_reservations_are_all_distinct() {
        let state = AppState::new();
        for _ in 0..10_000 {
            let number = reserve(&state, None, Uuid::new_v4()).expect("reservation failed");
            assert!(is_well_formed(&number));
        }
        assert_eq!(state.tracking_index.len(), 10_000);
    }

    #[test]
    fn supplied_number_conflicts_when_taken() {
        let state = AppState::new();
        reserve(&state, Some("TRK-AAAA0001".to_string()), Uuid::new_v4()).unwrap();

        let second = reserve(&state, Some("TRK-AAAA0001".to_string()), Uuid::new_v4());
        assert!(second.is_err());
    }

    #[test]
    fn released_numbers_can_be_reserved_again() {
        let state = AppState::new();
        reserve(&state, Some("TRK-00FF00FF".to_string()), Uuid::new_v4()).unwrap();
        super::release(&state, "TRK-00FF00FF");

        assert!(reserve(&state, Some("TRK-00FF00FF".to_string()), Uuid::new_v4()).is_ok());
    }
}
