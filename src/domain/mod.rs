//! Domain types shared by the data sources, the statistics engine and the CLI.
//!
//! These are the already-decoded shapes; the backend's wire payloads live in
//! [`crate::api::payload`] and are converted into these types at the boundary.

pub mod appointment;
pub mod unit;

pub use appointment::{AppointmentRecord, AppointmentStatus, Timestamp};
pub use unit::{CalledTicket, Coordinates, Service, Unit};

/// Identifier of a care unit
pub type UnitId = i64;

/// Identifier of a service (specialty) offered by a unit
pub type ServiceId = i64;
