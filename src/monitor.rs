//! Fetch-then-compute orchestration behind the list, detail and nearby views.
//!
//! Every per-unit and per-service fetch degrades to a default on failure so
//! that one unreachable endpoint never blanks the whole view; only failing to
//! list the units themselves is reported to the caller.

use crate::domain::{CalledTicket, Coordinates, Service, Unit, UnitId};
use crate::error::Result;
use crate::geo::{rank_by_distance, RankedUnit};
use crate::source::UpaDataSource;
use crate::stats::{compute_statistics, overall_average, StatisticsQuery, StatisticsResult, WaitLevel};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Row of the unit list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitOverview {
    pub unit: Unit,
    pub people_waiting: usize,
    pub average_minutes: u32,
    pub completed_count: usize,
}

impl UnitOverview {
    pub fn wait_level(&self) -> WaitLevel {
        WaitLevel::classify(self.average_minutes)
    }
}

/// Row of a unit's detail view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceWait {
    pub service: Service,
    pub people_waiting: usize,
    pub average_minutes: u32,
}

impl ServiceWait {
    pub fn wait_level(&self) -> WaitLevel {
        WaitLevel::classify(self.average_minutes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitDetail {
    pub unit: Unit,
    pub services: Vec<ServiceWait>,
    /// Mean of the per-service averages
    pub average_minutes: u32,
}

impl UnitDetail {
    pub fn service_count(&self) -> usize {
        self.services.len()
    }
}

pub struct QueueMonitor {
    source: Arc<dyn UpaDataSource>,
}

impl QueueMonitor {
    pub fn new(source: Arc<dyn UpaDataSource>) -> Self {
        Self { source }
    }

    /// Wait statistics for the query; a failed fetch counts as no data
    pub async fn statistics(&self, query: StatisticsQuery) -> StatisticsResult {
        match self.source.appointments(&query).await {
            Ok(records) => {
                let result = compute_statistics(&records, &query);
                debug!(
                    "Statistics for {:?}: {} records fetched, {} completed, average {} min",
                    query,
                    records.len(),
                    result.total_count,
                    result.average_minutes
                );
                result
            }
            Err(e) => {
                warn!("Failed to fetch appointments for {:?}: {}", query, e);
                StatisticsResult::fallback()
            }
        }
    }

    /// All units with their queue length and average wait, fetched in parallel
    pub async fn unit_overviews(&self) -> Result<Vec<UnitOverview>> {
        let units = self.source.list_units().await?;

        let overviews = units.into_iter().map(|unit| async move {
            let (queue, stats) = futures::join!(
                self.source.queue_by_unit(unit.id),
                self.statistics(StatisticsQuery::for_unit(unit.id))
            );

            let people_waiting = match queue {
                Ok(queue) => queue.len(),
                Err(e) => {
                    warn!("Failed to fetch queue for unit {} ({}): {}", unit.id, unit.name, e);
                    0
                }
            };

            UnitOverview {
                unit,
                people_waiting,
                average_minutes: stats.average_minutes,
                completed_count: stats.total_count,
            }
        });

        Ok(join_all(overviews).await)
    }

    /// Per-service waits for one unit
    pub async fn unit_detail(&self, unit_id: UnitId) -> Result<UnitDetail> {
        let unit = self.source.get_unit(unit_id).await?;

        let services = match self.source.services_by_unit(unit_id).await {
            Ok(services) => services,
            Err(e) => {
                warn!("Failed to fetch services for unit {}: {}", unit_id, e);
                Vec::new()
            }
        };

        let waits = services.into_iter().map(|service| async move {
            let (queue, stats) = futures::join!(
                self.source.queue_by_service(service.id),
                self.statistics(StatisticsQuery::for_service(unit_id, service.id))
            );

            let people_waiting = queue
                .map(|queue| queue.len())
                .unwrap_or_else(|e| {
                    warn!("Failed to fetch queue for service {}: {}", service.id, e);
                    0
                });

            ServiceWait {
                service,
                people_waiting,
                average_minutes: stats.average_minutes,
            }
        });
        let services = join_all(waits).await;

        let averages: Vec<u32> = services.iter().map(|wait| wait.average_minutes).collect();

        Ok(UnitDetail {
            unit,
            average_minutes: overall_average(&averages),
            services,
        })
    }

    /// Units ordered by distance from `origin`; backend order when unknown
    pub async fn nearby(&self, origin: Option<Coordinates>) -> Result<Vec<RankedUnit>> {
        let units = self.source.list_units().await?;
        Ok(rank_by_distance(units, origin))
    }

    /// Services of one unit, or every service when `unit_id` is `None`
    pub async fn services(&self, unit_id: Option<UnitId>) -> Result<Vec<Service>> {
        match unit_id {
            Some(unit_id) => self.source.services_by_unit(unit_id).await,
            None => self.source.list_services().await,
        }
    }

    pub async fn called_tickets(&self, unit_id: UnitId) -> Result<Vec<CalledTicket>> {
        self.source.called_tickets(unit_id).await
    }
}
