use serde::{Deserialize, Serialize};
use std::fmt;

/// Below this many minutes a wait is considered fast
pub const FAST_THRESHOLD_MINUTES: u32 = 30;

/// Below this many minutes a wait is considered moderate
pub const MODERATE_THRESHOLD_MINUTES: u32 = 60;

/// Coarse classification of an average wait, used to colour list rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitLevel {
    Fast,
    Moderate,
    Slow,
}

impl WaitLevel {
    pub fn classify(minutes: u32) -> Self {
        if minutes < FAST_THRESHOLD_MINUTES {
            Self::Fast
        } else if minutes < MODERATE_THRESHOLD_MINUTES {
            Self::Moderate
        } else {
            Self::Slow
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Moderate => "moderate",
            Self::Slow => "slow",
        }
    }
}

impl fmt::Display for WaitLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
