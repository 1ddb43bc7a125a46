//! Plain-text rendering of monitor results

use crate::domain::{CalledTicket, Service};
use crate::geo::{format_distance, RankedUnit};
use crate::monitor::{UnitDetail, UnitOverview};
use crate::stats::{StatisticsResult, WaitLevel};
use std::fmt::Write;

fn wait_line(people_waiting: usize, average_minutes: u32) -> String {
    format!(
        "{} waiting, ~{} min [{}]",
        people_waiting,
        average_minutes,
        WaitLevel::classify(average_minutes)
    )
}

pub fn format_overviews(overviews: &[UnitOverview]) -> String {
    if overviews.is_empty() {
        return "No units found\n".to_string();
    }

    let mut out = format!("{} units available\n", overviews.len());
    for overview in overviews {
        let _ = writeln!(out, "\n{} (#{})", overview.unit.name, overview.unit.id);
        if !overview.unit.address.is_empty() {
            let _ = writeln!(out, "  {}", overview.unit.address);
        }
        let _ = writeln!(
            out,
            "  {}",
            wait_line(overview.people_waiting, overview.average_minutes)
        );
    }
    out
}

pub fn format_detail(detail: &UnitDetail) -> String {
    let mut out = format!("{}\n", detail.unit.name);
    if !detail.unit.address.is_empty() {
        let _ = writeln!(out, "{}", detail.unit.address);
    }
    let _ = writeln!(
        out,
        "Average wait: {} min across {} specialties",
        detail.average_minutes,
        detail.service_count()
    );

    if detail.services.is_empty() {
        out.push_str("\nNo specialties available\n");
        return out;
    }

    out.push_str("\nQueues by specialty\n");
    for wait in &detail.services {
        let _ = writeln!(
            out,
            "  {:<20} {}",
            wait.service.name,
            wait_line(wait.people_waiting, wait.average_minutes)
        );
    }
    out
}

pub fn format_ranked(ranked: &[RankedUnit]) -> String {
    let mut out = String::new();
    for entry in ranked {
        match entry.distance_km {
            Some(km) => {
                let _ = writeln!(out, "{} - {}", entry.unit.name, format_distance(km));
            }
            None => {
                let _ = writeln!(out, "{}", entry.unit.name);
            }
        }
        if !entry.unit.address.is_empty() {
            let _ = writeln!(out, "  {}", entry.unit.address);
        }
        if let Some(coords) = entry.unit.coordinates() {
            let _ = writeln!(out, "  {}, {}", coords.latitude, coords.longitude);
        }
    }
    out
}

pub fn format_services(services: &[Service]) -> String {
    if services.is_empty() {
        return "No specialties available\n".to_string();
    }

    let mut out = String::new();
    for service in services {
        let _ = write!(out, "{:>4}  {}", service.id, service.name);
        if let Some(unit_id) = service.unit_id {
            let _ = write!(out, "  (unit #{unit_id})");
        }
        out.push('\n');
    }
    out
}

pub fn format_statistics(result: &StatisticsResult) -> String {
    format!(
        "Average service time: {} min\nCompleted appointments: {}\n",
        result.average_minutes, result.total_count
    )
}

pub fn format_tickets(tickets: &[CalledTicket]) -> String {
    if tickets.is_empty() {
        return "No tickets called\n".to_string();
    }

    let mut out = String::new();
    for ticket in tickets {
        let _ = write!(out, "{}", ticket.ticket);
        if let Some(service) = &ticket.service {
            let _ = write!(out, "  {service}");
        }
        if let Some(counter) = &ticket.counter {
            let _ = write!(out, "  counter {counter}");
        }
        out.push('\n');
    }
    out
}
