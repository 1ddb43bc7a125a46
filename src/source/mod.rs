//! Data sources for units, services and appointments.
//!
//! [`UpaDataSource`] is the seam between the monitor and the backend: the
//! binary injects [`HttpDataSource`], tests and demos inject
//! [`FixtureDataSource`].

pub mod fixture;
pub mod http;

pub use fixture::FixtureDataSource;
pub use http::HttpDataSource;

use crate::domain::{AppointmentRecord, CalledTicket, Service, ServiceId, Unit, UnitId};
use crate::error::Result;
use crate::stats::StatisticsQuery;
use async_trait::async_trait;

#[async_trait]
pub trait UpaDataSource: Send + Sync {
    async fn list_units(&self) -> Result<Vec<Unit>>;

    async fn get_unit(&self, unit_id: UnitId) -> Result<Unit>;

    async fn list_services(&self) -> Result<Vec<Service>>;

    async fn services_by_unit(&self, unit_id: UnitId) -> Result<Vec<Service>>;

    /// Appointments currently waiting at a unit
    async fn queue_by_unit(&self, unit_id: UnitId) -> Result<Vec<AppointmentRecord>>;

    /// Appointments currently waiting for a service
    async fn queue_by_service(&self, service_id: ServiceId) -> Result<Vec<AppointmentRecord>>;

    /// Appointments of any status for statistics.
    ///
    /// The unit filter is honoured; the service filter is passed along but
    /// may be ignored, so callers must re-filter by service.
    async fn appointments(&self, query: &StatisticsQuery) -> Result<Vec<AppointmentRecord>>;

    /// Tickets recently called on the unit's panel
    async fn called_tickets(&self, unit_id: UnitId) -> Result<Vec<CalledTicket>>;
}
