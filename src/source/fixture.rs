use super::UpaDataSource;
use crate::domain::{
    AppointmentRecord, AppointmentStatus, CalledTicket, Service, ServiceId, Timestamp, Unit,
    UnitId,
};
use crate::error::{Error, Result};
use crate::stats::StatisticsQuery;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

/// In-memory data source.
///
/// Like the backend, `appointments` honours the unit filter but ignores the
/// service filter.
#[derive(Debug, Clone, Default)]
pub struct FixtureDataSource {
    units: Vec<Unit>,
    services: Vec<Service>,
    appointments: Vec<(UnitId, AppointmentRecord)>,
    tickets: Vec<(UnitId, CalledTicket)>,
}

impl FixtureDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.units.push(unit);
        self
    }

    pub fn with_service(mut self, service: Service) -> Self {
        self.services.push(service);
        self
    }

    pub fn with_appointment(mut self, unit_id: UnitId, record: AppointmentRecord) -> Self {
        self.appointments.push((unit_id, record));
        self
    }

    pub fn with_ticket(mut self, unit_id: UnitId, ticket: CalledTicket) -> Self {
        self.tickets.push((unit_id, ticket));
        self
    }

    /// Three units around São Paulo's centre with nine services, waiting
    /// queues, and completed appointments whose averages are known.
    pub fn demo() -> Self {
        let units = [
            (1, "UPA Centro", "Rua Principal, 100 - Centro", -23.5505, -46.6333),
            (2, "UPA Zona Norte", "Av. Norte, 500 - Zona Norte", -23.5405, -46.6233),
            (3, "UPA Zona Sul", "Rua Sul, 300 - Zona Sul", -23.5605, -46.6433),
        ];
        // (service, unit, name, people waiting, average minutes)
        let services = [
            (1, 1, "Clínica Geral", 8, 25),
            (2, 1, "Pediatria", 5, 30),
            (3, 1, "Ortopedia", 2, 20),
            (4, 2, "Clínica Geral", 12, 45),
            (5, 2, "Cardiologia", 3, 35),
            (6, 2, "Pediatria", 7, 40),
            (7, 3, "Clínica Geral", 15, 55),
            (8, 3, "Pediatria", 10, 50),
            (9, 3, "Ortopedia", 4, 30),
        ];

        let mut source = Self::new();
        for (id, name, address, latitude, longitude) in units {
            source = source.with_unit(Unit {
                id,
                name: name.to_string(),
                address: address.to_string(),
                latitude: Some(latitude),
                longitude: Some(longitude),
            });
        }

        let base = demo_clock();
        for (service_id, unit_id, name, waiting, average) in services {
            source = source.with_service(Service {
                id: service_id,
                name: name.to_string(),
                unit_id: Some(unit_id),
            });

            for n in 0..waiting {
                let record = AppointmentRecord::new(
                    format!("q-{service_id}-{n}"),
                    AppointmentStatus::Waiting,
                )
                .with_started_at(base)
                .with_service(service_id);
                source = source.with_appointment(unit_id, record);
            }

            // Symmetric around the average so the mean is exact
            for (n, minutes) in [average - 5, average, average + 5].into_iter().enumerate() {
                source = source.with_appointment(
                    unit_id,
                    completed(format!("f-{service_id}-{n}"), service_id, base, minutes),
                );
            }
        }

        // Forgotten open record, closed hours later
        source = source.with_appointment(1, completed("f-1-outlier".to_string(), 1, base, 240));

        source
            .with_ticket(
                1,
                CalledTicket {
                    ticket: "CG012".to_string(),
                    service: Some("Clínica Geral".to_string()),
                    counter: Some("2".to_string()),
                    called_at: Some(Timestamp::from(base)),
                },
            )
            .with_ticket(
                1,
                CalledTicket {
                    ticket: "PE004".to_string(),
                    service: Some("Pediatria".to_string()),
                    counter: Some("5".to_string()),
                    called_at: Some(Timestamp::from(base - Duration::minutes(3))),
                },
            )
    }

    fn waiting(&self) -> impl Iterator<Item = &(UnitId, AppointmentRecord)> {
        self.appointments
            .iter()
            .filter(|(_, record)| record.status == AppointmentStatus::Waiting)
    }
}

fn demo_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

fn completed(id: String, service_id: ServiceId, finished: DateTime<Utc>, minutes: i64) -> AppointmentRecord {
    AppointmentRecord::new(id, AppointmentStatus::Finalized)
        .with_started_at(finished - Duration::minutes(minutes))
        .with_finished_at(finished)
        .with_service(service_id)
}

#[async_trait]
impl UpaDataSource for FixtureDataSource {
    async fn list_units(&self) -> Result<Vec<Unit>> {
        Ok(self.units.clone())
    }

    async fn get_unit(&self, unit_id: UnitId) -> Result<Unit> {
        self.units
            .iter()
            .find(|unit| unit.id == unit_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("unit {unit_id}")))
    }

    async fn list_services(&self) -> Result<Vec<Service>> {
        Ok(self.services.clone())
    }

    async fn services_by_unit(&self, unit_id: UnitId) -> Result<Vec<Service>> {
        Ok(self
            .services
            .iter()
            .filter(|service| service.unit_id == Some(unit_id))
            .cloned()
            .collect())
    }

    async fn queue_by_unit(&self, unit_id: UnitId) -> Result<Vec<AppointmentRecord>> {
        Ok(self
            .waiting()
            .filter(|(unit, _)| *unit == unit_id)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn queue_by_service(&self, service_id: ServiceId) -> Result<Vec<AppointmentRecord>> {
        Ok(self
            .waiting()
            .filter(|(_, record)| record.service_id == Some(service_id))
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn appointments(&self, query: &StatisticsQuery) -> Result<Vec<AppointmentRecord>> {
        Ok(self
            .appointments
            .iter()
            .filter(|(unit, _)| query.unit_id.map_or(true, |unit_id| *unit == unit_id))
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn called_tickets(&self, unit_id: UnitId) -> Result<Vec<CalledTicket>> {
        Ok(self
            .tickets
            .iter()
            .filter(|(unit, _)| *unit == unit_id)
            .map(|(_, ticket)| ticket.clone())
            .collect())
    }
}
