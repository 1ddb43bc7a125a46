//! Command-line interface: argument parsing, dispatch and rendering.

pub mod args;
pub mod output;

pub use args::{Cli, Commands};

use crate::config::Config;
use crate::domain::{Coordinates, UnitId};
use crate::monitor::QueueMonitor;
use crate::poller::Poller;
use crate::source::{FixtureDataSource, HttpDataSource, UpaDataSource};
use crate::stats::StatisticsQuery;
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Choose the data source for this invocation
pub fn build_source(config: &Config, fixtures: bool) -> Result<Arc<dyn UpaDataSource>> {
    if fixtures {
        debug!("Using built-in demo data");
        return Ok(Arc::new(FixtureDataSource::demo()));
    }
    let source = HttpDataSource::from_config(config).context("Backend is not configured")?;
    Ok(Arc::new(source))
}

fn print<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text(value));
    }
    Ok(())
}

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let source = build_source(&config, cli.fixtures)?;
    let monitor = Arc::new(QueueMonitor::new(source));
    let json = cli.json;

    match cli.command {
        Commands::Units => {
            let overviews = monitor.unit_overviews().await?;
            print(json, &overviews, |o| output::format_overviews(o))
        }
        Commands::Detail { unit_id } => {
            let detail = monitor.unit_detail(unit_id).await?;
            print(json, &detail, output::format_detail)
        }
        Commands::Nearby { lat, lon } => {
            let origin = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
            let ranked = monitor.nearby(origin).await?;
            print(json, &ranked, |r| output::format_ranked(r))
        }
        Commands::Services { unit } => {
            let services = monitor.services(unit).await?;
            print(json, &services, |s| output::format_services(s))
        }
        Commands::Stats { unit, service } => {
            let query = StatisticsQuery {
                unit_id: unit,
                service_id: service,
            };
            let result = monitor.statistics(query).await;
            print(json, &result, output::format_statistics)
        }
        Commands::Tickets { unit_id } => {
            let tickets = monitor.called_tickets(unit_id).await?;
            print(json, &tickets, |t| output::format_tickets(t))
        }
        Commands::Watch {
            unit_id,
            interval,
            count,
        } => {
            let period = interval.unwrap_or(config.poll_interval);
            watch(monitor, unit_id, period, count, json).await
        }
    }
}

async fn refresh(monitor: &QueueMonitor, unit_id: Option<UnitId>, json: bool) -> Result<()> {
    match unit_id {
        Some(unit_id) => {
            let detail = monitor.unit_detail(unit_id).await?;
            print(json, &detail, output::format_detail)
        }
        None => {
            let overviews = monitor.unit_overviews().await?;
            print(json, &overviews, |o| output::format_overviews(o))
        }
    }
}

async fn watch(
    monitor: Arc<QueueMonitor>,
    unit_id: Option<UnitId>,
    period: Duration,
    count: Option<usize>,
    json: bool,
) -> Result<()> {
    anyhow::ensure!(!period.is_zero(), "Refresh interval must be positive");
    info!("Refreshing every {:?}", period);

    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let mut handle = Poller::new(period).start(move || {
        let monitor = monitor.clone();
        let done_tx = done_tx.clone();
        async move {
            if let Err(e) = refresh(&monitor, unit_id, json).await {
                error!("Refresh failed: {:#}", e);
                eprintln!("Error: {e:#}");
            }
            let _ = done_tx.send(());
        }
    });

    let mut runs = 0;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping");
                break;
            }
            Some(()) = done_rx.recv() => {
                runs += 1;
                if count.is_some_and(|limit| runs >= limit) {
                    break;
                }
            }
        }
    }

    handle.cancel();
    Ok(())
}
