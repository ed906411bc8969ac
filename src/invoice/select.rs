use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

use crate::config::{Ledger, LogEntry, LogKind, Project};

/// Billing period applied to log dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    All,
    Month { year: i32, month: u32 },
    /// Inclusive on both ends; ignored unless both ends are set
    Range {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl Period {
    fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            Period::All => true,
            Period::Month { year, month } => date.year() == year && date.month() == month,
            Period::Range {
                start: Some(start),
                end: Some(end),
            } => date >= start && date <= end,
            Period::Range { .. } => true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub client: String,
    pub project_id: Option<String>,
    pub period: Period,
}

/// The client a log is billed to: its override, else its project's client
pub fn client_of<'a>(log: &'a LogEntry, projects: &'a [Project]) -> Option<&'a str> {
    log.client
        .as_deref()
        .filter(|c| !c.is_empty())
        .or_else(|| {
            projects
                .iter()
                .find(|p| p.id == log.project_id)
                .map(|p| p.client.as_str())
        })
}

/// Logs matching the filter, newest first
pub fn select_logs<'a>(ledger: &'a Ledger, filter: &LogFilter) -> Vec<&'a LogEntry> {
    let mut selected: Vec<&LogEntry> = ledger
        .logs
        .iter()
        .filter(|l| client_of(l, &ledger.projects) == Some(filter.client.as_str()))
        .filter(|l| {
            filter
                .project_id
                .as_deref()
                .map_or(true, |id| l.project_id == id)
        })
        .filter(|l| filter.period.contains(l.date))
        .collect();

    selected.sort_by(|a, b| b.date.cmp(&a.date));
    selected
}

/// Earliest stay check-in among the given logs
pub fn earliest_check_in(logs: &[&LogEntry]) -> Option<NaiveDate> {
    logs.iter()
        .filter_map(|l| match l.kind {
            LogKind::Stay { check_in, .. } => Some(check_in),
            _ => None,
        })
        .min()
}

/// Every client name known from projects and log overrides, sorted
pub fn client_directory(ledger: &Ledger) -> Vec<String> {
    let from_projects = ledger.projects.iter().map(|p| p.client.as_str());
    let from_logs = ledger.logs.iter().filter_map(|l| l.client.as_deref());

    from_projects
        .chain(from_logs)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ledger() -> Ledger {
        let project = |id: &str, client: &str| Project {
            id: id.to_string(),
            name: format!("Project {id}"),
            client: client.to_string(),
            email: None,
            phone: None,
            address: None,
            hourly_rate: 100.0,
            status: Default::default(),
            created_at: Utc::now(),
        };
        let log = |id: &str, project: &str, client: Option<&str>, day: &str, kind: LogKind| {
            LogEntry {
                id: id.to_string(),
                project_id: project.to_string(),
                client: client.map(str::to_string),
                date: date(day),
                description: String::new(),
                created_at: Utc::now(),
                kind,
            }
        };

        Ledger {
            projects: vec![project("p1", "Smith"), project("p2", "Jones")],
            logs: vec![
                log("l1", "p1", None, "2024-05-03", LogKind::time(2.0)),
                log("l2", "p1", None, "2024-06-10", LogKind::time(1.0)),
                log(
                    "l3",
                    "p2",
                    Some("Smith"),
                    "2024-05-20",
                    LogKind::stay(
                        date("2024-05-20"),
                        date("2024-05-23"),
                        150.0,
                        Default::default(),
                    ),
                ),
                log("l4", "p2", None, "2024-05-21", LogKind::time(3.0)),
                log("l5", "p1", Some("Garcia"), "2024-05-22", LogKind::time(3.0)),
            ],
            invoices: Vec::new(),
        }
    }

    fn ids(logs: &[&LogEntry]) -> Vec<String> {
        logs.iter().map(|l| l.id.clone()).collect()
    }

    #[test]
    fn client_override_wins_and_sorts_newest_first() {
        let ledger = ledger();
        let filter = LogFilter {
            client: "Smith".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&select_logs(&ledger, &filter)), ["l2", "l3", "l1"]);
    }

    #[test]
    fn month_and_project_narrow_selection() {
        let ledger = ledger();
        let filter = LogFilter {
            client: "Smith".to_string(),
            project_id: Some("p1".to_string()),
            period: Period::Month {
                year: 2024,
                month: 5,
            },
        };
        assert_eq!(ids(&select_logs(&ledger, &filter)), ["l1"]);
    }

    #[test]
    fn half_open_range_is_ignored() {
        let ledger = ledger();
        let filter = LogFilter {
            client: "Smith".to_string(),
            project_id: None,
            period: Period::Range {
                start: Some(date("2024-06-01")),
                end: None,
            },
        };
        assert_eq!(select_logs(&ledger, &filter).len(), 3);

        let filter = LogFilter {
            period: Period::Range {
                start: Some(date("2024-05-01")),
                end: Some(date("2024-05-20")),
            },
            ..filter
        };
        assert_eq!(ids(&select_logs(&ledger, &filter)), ["l3", "l1"]);
    }

    #[test]
    fn earliest_check_in_and_directory() {
        let ledger = ledger();
        let filter = LogFilter {
            client: "Smith".to_string(),
            ..Default::default()
        };
        let logs = select_logs(&ledger, &filter);
        assert_eq!(earliest_check_in(&logs), Some(date("2024-05-20")));
        assert_eq!(client_directory(&ledger), ["Garcia", "Jones", "Smith"]);
    }
}
