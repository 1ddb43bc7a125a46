//! Wait-time statistics derived client-side from raw appointment records.
//!
//! The backend does not report service times directly, so the average is
//! computed from the start and finish timestamps of completed appointments.

pub mod engine;
pub mod level;

pub use engine::{
    compute_statistics, overall_average, StatisticsQuery, StatisticsResult,
    FALLBACK_AVERAGE_MINUTES, MAX_PLAUSIBLE_MINUTES,
};
pub use level::WaitLevel;
