use crate::domain::appointment::round_half_up;
use crate::domain::{AppointmentRecord, ServiceId, UnitId};
use serde::{Deserialize, Serialize};

/// Average reported when no usable duration exists
pub const FALLBACK_AVERAGE_MINUTES: u32 = 15;

/// Longest duration accepted into the average; anything above is treated as an entry error
pub const MAX_PLAUSIBLE_MINUTES: i64 = 180;

/// Filters applied when fetching and aggregating records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsQuery {
    pub unit_id: Option<UnitId>,
    pub service_id: Option<ServiceId>,
}

impl StatisticsQuery {
    pub fn for_unit(unit_id: UnitId) -> Self {
        Self {
            unit_id: Some(unit_id),
            service_id: None,
        }
    }

    pub fn for_service(unit_id: UnitId, service_id: ServiceId) -> Self {
        Self {
            unit_id: Some(unit_id),
            service_id: Some(service_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsResult {
    /// Average service duration in minutes, always positive
    pub average_minutes: u32,
    /// Completed records matching the query, including those left out of the average
    pub total_count: usize,
}

impl StatisticsResult {
    /// Result used when there is no data at all
    pub fn fallback() -> Self {
        Self {
            average_minutes: FALLBACK_AVERAGE_MINUTES,
            total_count: 0,
        }
    }
}

impl Default for StatisticsResult {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Compute the average service duration over completed records.
///
/// `records` are expected to be already narrowed to `query.unit_id` by the
/// data source. The service filter is re-applied here because the backend
/// does not reliably honour it. Records whose duration is missing, not
/// positive, or above [`MAX_PLAUSIBLE_MINUTES`] are left out of the average
/// but still counted in `total_count`.
pub fn compute_statistics(records: &[AppointmentRecord], query: &StatisticsQuery) -> StatisticsResult {
    let completed: Vec<&AppointmentRecord> = records
        .iter()
        .filter(|record| record.is_completed())
        .filter(|record| match query.service_id {
            Some(service_id) => record.service_id == Some(service_id),
            None => true,
        })
        .collect();

    if completed.is_empty() {
        return StatisticsResult::fallback();
    }

    let durations: Vec<i64> = completed
        .iter()
        .filter_map(|record| record.duration_minutes())
        .filter(|minutes| *minutes > 0 && *minutes <= MAX_PLAUSIBLE_MINUTES)
        .collect();

    let average_minutes = if durations.is_empty() {
        FALLBACK_AVERAGE_MINUTES
    } else {
        let total: i64 = durations.iter().sum();
        round_half_up(total as f64 / durations.len() as f64) as u32
    };

    StatisticsResult {
        average_minutes,
        total_count: completed.len(),
    }
}

/// Rounded mean of per-service averages, or the fallback when there are none
pub fn overall_average(averages: &[u32]) -> u32 {
    if averages.is_empty() {
        return FALLBACK_AVERAGE_MINUTES;
    }
    let total: u64 = averages.iter().map(|minutes| u64::from(*minutes)).sum();
    round_half_up(total as f64 / averages.len() as f64) as u32
}
