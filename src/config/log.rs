use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{InvoiceError, Result};
use crate::invoice::rate::{expense_amounts, stay_amount};

/// How a stay's rate is applied
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StayPricing {
    #[default]
    Nightly,
    Flat,
}

impl FromStr for StayPricing {
    type Err = InvoiceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nightly" => Ok(StayPricing::Nightly),
            "flat" => Ok(StayPricing::Flat),
            _ => Err(InvoiceError::InvalidValue {
                field: "pricing".to_string(),
                value: s.to_string(),
                reason: "use 'nightly' or 'flat'".to_string(),
            }),
        }
    }
}

/// Type-specific payload of a log entry.
///
/// `billable_amount` (and `profit` for expenses) are derived once when the
/// entry is created or edited and stored as-is. Invoicing reads the stored
/// value and only re-derives nights for display.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogKind {
    Time {
        hours: f64,
    },
    Expense {
        cost: f64,
        markup_percent: f64,
        billable_amount: f64,
        profit: f64,
    },
    Stay {
        check_in: NaiveDate,
        check_out: NaiveDate,
        rate: f64,
        pricing: StayPricing,
        billable_amount: f64,
    },
}

impl LogKind {
    pub fn time(hours: f64) -> Self {
        LogKind::Time { hours }
    }

    pub fn expense(cost: f64, markup_percent: f64) -> Self {
        let (billable_amount, profit) = expense_amounts(cost, markup_percent);
        LogKind::Expense {
            cost,
            markup_percent,
            billable_amount,
            profit,
        }
    }

    pub fn stay(check_in: NaiveDate, check_out: NaiveDate, rate: f64, pricing: StayPricing) -> Self {
        LogKind::Stay {
            check_in,
            check_out,
            rate,
            pricing,
            billable_amount: stay_amount(check_in, check_out, rate, pricing),
        }
    }

    /// Rejects payloads whose billable amount would be negative or undefined
    pub fn validate(&self) -> Result<()> {
        match *self {
            LogKind::Time { hours } => non_negative("hours", hours),
            LogKind::Expense {
                cost,
                markup_percent,
                ..
            } => {
                non_negative("cost", cost)?;
                if !markup_percent.is_finite() || markup_percent < -100.0 {
                    return Err(InvoiceError::InvalidValue {
                        field: "markup".to_string(),
                        value: markup_percent.to_string(),
                        reason: "must be a number of at least -100".to_string(),
                    });
                }
                Ok(())
            }
            LogKind::Stay {
                check_in,
                check_out,
                rate,
                ..
            } => {
                non_negative("rate", rate)?;
                if check_out <= check_in {
                    return Err(InvoiceError::InvalidValue {
                        field: "check-out".to_string(),
                        value: check_out.to_string(),
                        reason: "must be after check-in".to_string(),
                    });
                }
                Ok(())
            }
        }
    }

    pub fn log_type(&self) -> LogType {
        match self {
            LogKind::Time { .. } => LogType::Time,
            LogKind::Expense { .. } => LogType::Expense,
            LogKind::Stay { .. } => LogType::Stay,
        }
    }
}

/// Discriminant of [`LogKind`], carried on invoice lines
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogType {
    Time,
    Expense,
    Stay,
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogType::Time => write!(f, "TIME"),
            LogType::Expense => write!(f, "EXPENSE"),
            LogType::Stay => write!(f, "STAY"),
        }
    }
}

/// One unit of billable activity
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogEntry {
    pub id: String,
    pub project_id: String,
    /// Overrides the project's client (the guest name for stays)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub kind: LogKind,
}

/// Partial update for a log entry. Kind-specific fields must match the
/// entry's kind.
#[derive(Debug, Default, Clone)]
pub struct LogPatch {
    pub project_id: Option<String>,
    pub client: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub hours: Option<f64>,
    pub cost: Option<f64>,
    pub markup_percent: Option<f64>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub rate: Option<f64>,
    pub pricing: Option<StayPricing>,
}

impl LogPatch {
    fn touches_time(&self) -> bool {
        self.hours.is_some()
    }

    fn touches_expense(&self) -> bool {
        self.cost.is_some() || self.markup_percent.is_some()
    }

    fn touches_stay(&self) -> bool {
        self.check_in.is_some()
            || self.check_out.is_some()
            || self.rate.is_some()
            || self.pricing.is_some()
    }
}

fn non_negative(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InvoiceError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be zero or more".to_string(),
        })
    }
}

fn not_applicable(field: &str, log_type: LogType) -> InvoiceError {
    InvoiceError::InvalidValue {
        field: field.to_string(),
        value: log_type.to_string(),
        reason: "field does not apply to this log type".to_string(),
    }
}

impl LogEntry {
    /// Apply a patch and re-derive the stored billable amounts
    pub fn apply(&mut self, patch: LogPatch) -> Result<()> {
        let log_type = self.kind.log_type();
        match &self.kind {
            LogKind::Time { .. } if patch.touches_expense() => {
                return Err(not_applicable("cost/markup", log_type))
            }
            LogKind::Time { .. } if patch.touches_stay() => {
                return Err(not_applicable("stay dates/rate", log_type))
            }
            LogKind::Expense { .. } if patch.touches_time() => {
                return Err(not_applicable("hours", log_type))
            }
            LogKind::Expense { .. } if patch.touches_stay() => {
                return Err(not_applicable("stay dates/rate", log_type))
            }
            LogKind::Stay { .. } if patch.touches_time() => {
                return Err(not_applicable("hours", log_type))
            }
            LogKind::Stay { .. } if patch.touches_expense() => {
                return Err(not_applicable("cost/markup", log_type))
            }
            _ => {}
        }

        let kind = match self.kind.clone() {
            LogKind::Time { hours } => LogKind::time(patch.hours.unwrap_or(hours)),
            LogKind::Expense {
                cost,
                markup_percent,
                ..
            } => LogKind::expense(
                patch.cost.unwrap_or(cost),
                patch.markup_percent.unwrap_or(markup_percent),
            ),
            LogKind::Stay {
                check_in,
                check_out,
                rate,
                pricing,
                ..
            } => LogKind::stay(
                patch.check_in.unwrap_or(check_in),
                patch.check_out.unwrap_or(check_out),
                patch.rate.unwrap_or(rate),
                patch.pricing.unwrap_or(pricing),
            ),
        };
        kind.validate()?;

        if let Some(project_id) = patch.project_id {
            self.project_id = project_id;
        }
        if let Some(client) = patch.client {
            self.client = if client.is_empty() { None } else { Some(client) };
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }

        self.kind = kind;

        Ok(())
    }

    /// Stored client-facing amount; TIME entries have none until priced
    pub fn stored_amount(&self) -> Option<f64> {
        match self.kind {
            LogKind::Time { .. } => None,
            LogKind::Expense {
                billable_amount, ..
            }
            | LogKind::Stay {
                billable_amount, ..
            } => Some(billable_amount),
        }
    }
}
