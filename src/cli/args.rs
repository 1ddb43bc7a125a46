//! CLI argument structures

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Queue-wait information for public urgent-care units
#[derive(Parser)]
#[command(name = "upa-monitor")]
#[command(about = "upa-monitor - Queue-wait information for urgent-care units (UPAs)", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Use built-in demo data instead of the backend
    #[arg(long, global = true)]
    pub fixtures: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List units with people waiting and average wait
    Units,

    /// Show per-specialty waits for one unit
    Detail {
        /// Unit identifier
        unit_id: i64,
    },

    /// List units ordered by distance from a location
    Nearby {
        /// Latitude in decimal degrees
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in decimal degrees
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// List services (specialties), optionally for one unit
    Services {
        /// Restrict to a unit
        #[arg(long)]
        unit: Option<i64>,
    },

    /// Compute wait statistics from raw appointments
    Stats {
        /// Restrict to a unit
        #[arg(long)]
        unit: Option<i64>,

        /// Restrict to a service (specialty)
        #[arg(long)]
        service: Option<i64>,
    },

    /// Show tickets recently called on a unit's panel
    Tickets {
        /// Unit identifier
        unit_id: i64,
    },

    /// Refresh the unit list (or one unit's detail) periodically until interrupted
    Watch {
        /// Unit identifier; omit to watch the unit list
        unit_id: Option<i64>,

        /// Refresh interval, e.g. "30s" or "2m" (defaults to the configured value)
        #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
        interval: Option<Duration>,

        /// Stop after this many refreshes
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
}
