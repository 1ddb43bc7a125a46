//! # upa-monitor
//!
//! Queue-wait information for public urgent-care units (UPAs), derived from
//! a REST backend's unit, service and appointment data.
//!
//! ## Usage
//!
//! ```bash
//! upa-monitor units
//! upa-monitor detail 1
//! upa-monitor nearby --lat=-23.55 --lon=-46.63
//! upa-monitor watch --interval 30s
//! ```
//!
//! ## Modules
//!
//! - `stats` - Average service time from raw appointment records, with sanity filtering and fallbacks
//! - `domain` - Units, services, appointments and timestamps
//! - `geo` - Great-circle distance and distance ranking
//! - `auth` - OAuth2 password-grant token provider with expiry tracking
//! - `api` - Authenticated REST client and wire payloads
//! - `source` - Injectable data sources (HTTP and in-memory fixtures)
//! - `monitor` - Views assembled from parallel fetches, degrading to defaults on failure
//! - `poller` - Periodic refresh with explicit cancellation
//! - `config` - TOML and environment configuration
//! - `cli` - Command-line interface
pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod geo;
pub mod monitor;
pub mod poller;
pub mod source;
pub mod stats;

pub use error::{Error, Result};
