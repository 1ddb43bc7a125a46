//! Great-circle distances and distance ranking of units.

use crate::domain::{Coordinates, Unit};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Mean earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometres
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
            * to.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Human-readable distance: whole metres below 1 km, otherwise km with one decimal
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{}m", (km * 1000.0).round() as i64)
    } else {
        format!("{km:.1}km")
    }
}

/// A unit together with its distance from the user, when known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedUnit {
    pub unit: Unit,
    pub distance_km: Option<f64>,
}

/// Order units by distance from `origin`.
///
/// Units without a known distance (no origin, or missing coordinates) are
/// placed after all others, keeping their original relative order.
pub fn rank_by_distance(units: Vec<Unit>, origin: Option<Coordinates>) -> Vec<RankedUnit> {
    let mut ranked: Vec<RankedUnit> = units
        .into_iter()
        .map(|unit| {
            let distance_km = origin
                .zip(unit.coordinates())
                .map(|(from, to)| haversine_km(from, to));
            RankedUnit { unit, distance_km }
        })
        .collect();

    ranked.sort_by(|a, b| match (a.distance_km, b.distance_km) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    ranked
}
