//! Billable amounts for log entries.

use chrono::NaiveDate;
use tracing::error;

use crate::config::{LogEntry, LogKind, Project, StayPricing};

/// How far a stored stay amount may drift from `rate * nights` and still
/// be shown as a nightly line
pub const STAY_MATCH_TOLERANCE: f64 = 0.10;

/// Nights between check-in and check-out, order-insensitive
pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> u32 {
    (check_out - check_in).num_days().unsigned_abs() as u32
}

/// Returns `(billable_amount, profit)` for an expense
pub fn expense_amounts(cost: f64, markup_percent: f64) -> (f64, f64) {
    let billable = cost * (1.0 + markup_percent / 100.0);
    (billable, billable - cost)
}

pub fn stay_amount(
    check_in: NaiveDate,
    check_out: NaiveDate,
    rate: f64,
    pricing: StayPricing,
) -> f64 {
    match pricing {
        StayPricing::Flat => rate,
        StayPricing::Nightly => rate * nights(check_in, check_out) as f64,
    }
}

/// Hours times the project's rate. A missing project is a broken reference,
/// not a user error: it is logged and priced at zero.
pub fn time_amount(log: &LogEntry, hours: f64, project: Option<&Project>) -> f64 {
    match project {
        Some(project) => hours * project.hourly_rate,
        None => {
            error!(
                log = %log.id,
                project = %log.project_id,
                "time entry references a missing project; pricing it at 0"
            );
            0.0
        }
    }
}

/// Client-facing amount for any log entry
pub fn billable_amount(log: &LogEntry, projects: &[Project]) -> f64 {
    if let Some(amount) = log.stored_amount() {
        return amount;
    }
    match log.kind {
        LogKind::Time { hours } => {
            let project = projects.iter().find(|p| p.id == log.project_id);
            time_amount(log, hours, project)
        }
        _ => 0.0,
    }
}

/// Quantity to print for a stay line.
///
/// No pricing mode travels with the invoice line, so the mode is inferred:
/// when the stored amount matches `rate * nights` the line shows nights,
/// otherwise it is a flat fee of one.
pub fn stay_quantity(amount: f64, rate: f64, nights: u32) -> f64 {
    if rate > 0.0 && (amount - rate * nights as f64).abs() < STAY_MATCH_TOLERANCE {
        nights as f64
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn time_log(project_id: &str, hours: f64) -> LogEntry {
        LogEntry {
            id: "log-1".to_string(),
            project_id: project_id.to_string(),
            client: None,
            date: date("2024-05-02"),
            description: "Consulting".to_string(),
            created_at: Utc::now(),
            kind: LogKind::time(hours),
        }
    }

    fn project(id: &str, rate: f64) -> Project {
        Project {
            id: id.to_string(),
            name: "Casa Palo Fierro".to_string(),
            client: "Smith".to_string(),
            email: None,
            phone: None,
            address: None,
            hourly_rate: rate,
            status: Default::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn nights_ignore_date_order() {
        assert_eq!(nights(date("2024-06-01"), date("2024-06-04")), 3);
        assert_eq!(nights(date("2024-06-04"), date("2024-06-01")), 3);
        assert_eq!(nights(date("2024-06-01"), date("2024-06-01")), 0);
    }

    #[test]
    fn time_uses_project_rate() {
        let projects = vec![project("p-1", 120.0)];
        let log = time_log("p-1", 2.5);
        assert!((billable_amount(&log, &projects) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn time_with_missing_project_is_zero() {
        let projects = vec![project("p-1", 120.0)];
        let log = time_log("gone", 4.0);
        assert_eq!(billable_amount(&log, &projects), 0.0);
    }

    #[test]
    fn flat_stay_ignores_span() {
        let amount = stay_amount(
            date("2024-06-01"),
            date("2024-06-10"),
            450.0,
            StayPricing::Flat,
        );
        assert_eq!(amount, 450.0);
    }

    #[test]
    fn stay_quantity_infers_mode() {
        assert_eq!(stay_quantity(600.0, 200.0, 3), 3.0);
        assert_eq!(stay_quantity(600.05, 200.0, 3), 3.0);
        assert_eq!(stay_quantity(450.0, 450.0, 9), 1.0);
        assert_eq!(stay_quantity(600.0, 0.0, 3), 1.0);
    }
}
