use chrono::NaiveDate;

use super::rate::{nights, stay_quantity, time_amount};
use crate::config::{InvoiceItem, LogEntry, LogKind, Project};

/// Line items built from a set of logs
#[derive(Debug, Clone)]
pub struct InvoiceLines {
    pub items: Vec<InvoiceItem>,
    pub subtotal: f64,
}

/// Dates on invoices read MM/DD/YYYY
pub fn display_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

/// One line per log, in input order
pub fn build_lines(logs: &[&LogEntry], projects: &[Project]) -> InvoiceLines {
    let items: Vec<InvoiceItem> = logs.iter().map(|log| build_line(log, projects)).collect();
    let subtotal = items.iter().map(|i| i.amount).sum();

    InvoiceLines { items, subtotal }
}

fn build_line(log: &LogEntry, projects: &[Project]) -> InvoiceItem {
    let log_type = log.kind.log_type();

    let (description, quantity, rate, amount, dates) = match &log.kind {
        LogKind::Time { hours } => {
            let project = projects.iter().find(|p| p.id == log.project_id);
            let rate = project.map_or(0.0, |p| p.hourly_rate);
            let amount = time_amount(log, *hours, project);
            let dates = if *hours > 0.0 {
                format!("{} ({}h)", display_date(log.date), hours)
            } else {
                display_date(log.date)
            };
            (log.description.clone(), *hours, rate, amount, dates)
        }
        LogKind::Expense {
            cost,
            billable_amount,
            ..
        } => (
            log.description.clone(),
            1.0,
            *cost,
            *billable_amount,
            display_date(log.date),
        ),
        LogKind::Stay {
            check_in,
            check_out,
            rate,
            billable_amount,
            ..
        } => {
            let quantity = stay_quantity(*billable_amount, *rate, nights(*check_in, *check_out));
            let dates = format!(
                "{} to {}",
                display_date(*check_in),
                display_date(*check_out)
            );
            (
                "Guest Stay".to_string(),
                quantity,
                *rate,
                *billable_amount,
                dates,
            )
        }
    };

    InvoiceItem {
        description,
        quantity,
        rate,
        amount,
        log_type,
        original_log_id: log.id.clone(),
        dates: Some(dates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogType, StayPricing};
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn log(id: &str, description: &str, kind: LogKind) -> LogEntry {
        LogEntry {
            id: id.to_string(),
            project_id: "p-1".to_string(),
            client: None,
            date: date("2024-05-14"),
            description: description.to_string(),
            created_at: Utc::now(),
            kind,
        }
    }

    fn projects() -> Vec<Project> {
        vec![Project {
            id: "p-1".to_string(),
            name: "Desert House".to_string(),
            client: "Smith".to_string(),
            email: None,
            phone: None,
            address: None,
            hourly_rate: 80.0,
            status: Default::default(),
            created_at: Utc::now(),
        }]
    }

    #[test]
    fn builds_lines_in_order_with_labels() {
        let stay = log(
            "a",
            "Stay: Smith family",
            LogKind::stay(
                date("2024-06-01"),
                date("2024-06-04"),
                200.0,
                StayPricing::Nightly,
            ),
        );
        let time = log("b", "Pool repair coordination", LogKind::time(1.5));
        let expense = log("c", "Cleaning supplies", LogKind::expense(40.0, 25.0));
        let projects = projects();

        let lines = build_lines(&[&stay, &time, &expense], &projects);

        assert_eq!(lines.items.len(), 3);

        let first = &lines.items[0];
        assert_eq!(first.description, "Guest Stay");
        assert_eq!(first.quantity, 3.0);
        assert_eq!(first.rate, 200.0);
        assert_eq!(first.amount, 600.0);
        assert_eq!(first.log_type, LogType::Stay);
        assert_eq!(first.dates.as_deref(), Some("06/01/2024 to 06/04/2024"));

        let second = &lines.items[1];
        assert_eq!(second.description, "Pool repair coordination");
        assert_eq!(second.amount, 120.0);
        assert_eq!(second.dates.as_deref(), Some("05/14/2024 (1.5h)"));
        assert_eq!(second.original_log_id, "b");

        let third = &lines.items[2];
        assert_eq!(third.quantity, 1.0);
        assert_eq!(third.rate, 40.0);
        assert_eq!(third.amount, 50.0);
        assert_eq!(third.dates.as_deref(), Some("05/14/2024"));

        assert!((lines.subtotal - 770.0).abs() < 1e-9);
    }

    #[test]
    fn flat_stay_is_one_unit() {
        let stay = log(
            "a",
            "",
            LogKind::stay(
                date("2024-06-01"),
                date("2024-06-08"),
                900.0,
                StayPricing::Flat,
            ),
        );
        let lines = build_lines(&[&stay], &projects());
        assert_eq!(lines.items[0].quantity, 1.0);
        assert_eq!(lines.items[0].amount, 900.0);
    }

    #[test]
    fn orphaned_time_line_degrades_to_zero() {
        let mut time = log("a", "Orphan", LogKind::time(3.0));
        time.project_id = "missing".to_string();
        let lines = build_lines(&[&time], &projects());
        assert_eq!(lines.items[0].rate, 0.0);
        assert_eq!(lines.items[0].amount, 0.0);
        assert_eq!(lines.subtotal, 0.0);
    }
}
