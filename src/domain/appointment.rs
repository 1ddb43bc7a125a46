use super::ServiceId;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw timestamp as delivered by the backend.
///
/// Presence and validity are tracked separately: a record may carry a
/// completion timestamp that cannot be parsed, which still marks it as
/// completed but yields no duration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the raw value carries anything at all
    pub fn is_present(&self) -> bool {
        !self.0.trim().is_empty()
    }

    /// Parse as RFC 3339, falling back to an offset-less ISO 8601 date-time read as UTC
    pub fn parse(&self) -> Option<DateTime<Utc>> {
        let raw = self.0.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }

        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(|naive| naive.and_utc())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.to_rfc3339())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of an appointment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Waiting,
    InService,
    Finalized,
    Cancelled,
    Other(String),
}

impl AppointmentStatus {
    /// Backend label for this status
    pub fn label(&self) -> &str {
        match self {
            Self::Waiting => "aguardando",
            Self::InService => "em_atendimento",
            Self::Finalized => "finalizado",
            Self::Cancelled => "cancelado",
            Self::Other(label) => label,
        }
    }

    /// Map a backend status label; unknown labels are kept verbatim
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "aguardando" => Self::Waiting,
            "em_atendimento" => Self::InService,
            "finalizado" => Self::Finalized,
            "cancelado" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }

    /// Map the backend's numeric status code
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Waiting,
            other => Self::Other(other.to_string()),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single appointment as seen by the statistics engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: String,
    pub status: AppointmentStatus,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
    /// Alternate completion stamp; marks the record as completed but never feeds a duration
    pub closed_at: Option<Timestamp>,
    pub service_id: Option<ServiceId>,
}

impl AppointmentRecord {
    pub fn new(id: impl Into<String>, status: AppointmentStatus) -> Self {
        Self {
            id: id.into(),
            status,
            started_at: None,
            finished_at: None,
            closed_at: None,
            service_id: None,
        }
    }

    pub fn with_started_at(mut self, started_at: impl Into<Timestamp>) -> Self {
        self.started_at = Some(started_at.into());
        self
    }

    pub fn with_finished_at(mut self, finished_at: impl Into<Timestamp>) -> Self {
        self.finished_at = Some(finished_at.into());
        self
    }

    pub fn with_closed_at(mut self, closed_at: impl Into<Timestamp>) -> Self {
        self.closed_at = Some(closed_at.into());
        self
    }

    pub fn with_service(mut self, service_id: ServiceId) -> Self {
        self.service_id = Some(service_id);
        self
    }

    /// Finalized and carrying completion metadata
    pub fn is_completed(&self) -> bool {
        self.status == AppointmentStatus::Finalized
            && [&self.finished_at, &self.closed_at]
                .into_iter()
                .any(|stamp| stamp.as_ref().is_some_and(Timestamp::is_present))
    }

    /// Service duration in whole minutes, rounded to nearest.
    ///
    /// `None` when either timestamp is missing or unparseable.
    pub fn duration_minutes(&self) -> Option<i64> {
        let started = self.started_at.as_ref()?.parse()?;
        let finished = self.finished_at.as_ref()?.parse()?;
        let millis = (finished - started).num_milliseconds() as f64;
        Some(round_half_up(millis / 60_000.0) as i64)
    }
}

/// Round half towards positive infinity, matching the backend's reporting
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
