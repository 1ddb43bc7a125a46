use super::{ServiceId, Timestamp, UnitId};
use serde::{Deserialize, Serialize};

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Urgent-care unit (UPA)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Unit {
    /// Position of the unit, only when both coordinates are known
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            _ => None,
        }
    }
}

/// Specialty offered by a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub unit_id: Option<UnitId>,
}

/// Ticket recently called on a unit's panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalledTicket {
    pub ticket: String,
    pub service: Option<String>,
    pub counter: Option<String>,
    pub called_at: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_require_both_axes() {
        let mut unit = Unit {
            id: 1,
            name: "UPA Centro".to_string(),
            address: "Rua Principal, 100".to_string(),
            latitude: Some(-23.5505),
            longitude: None,
        };
        assert!(unit.coordinates().is_none());

        unit.longitude = Some(-46.6333);
        assert_eq!(
            unit.coordinates(),
            Some(Coordinates::new(-23.5505, -46.6333))
        );
    }
}
