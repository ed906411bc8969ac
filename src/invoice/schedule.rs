use chrono::{Days, NaiveDate};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::lines::display_date;
use crate::config::{InvoiceSchedule, PaymentTerms};
use crate::error::InvoiceError;

pub const DEPOSIT_LABEL: &str = "Deposit (50% due upon booking)";
pub const BALANCE_LABEL: &str = "Balance (Due on or before check-in)";

/// How the remaining balance is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentStructure {
    #[default]
    Full,
    Deposit50,
}

impl fmt::Display for PaymentStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStructure::Full => write!(f, "FULL"),
            PaymentStructure::Deposit50 => write!(f, "DEPOSIT_50"),
        }
    }
}

impl FromStr for PaymentStructure {
    type Err = InvoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "FULL" => Ok(PaymentStructure::Full),
            "DEPOSIT_50" | "DEPOSIT50" | "DEPOSIT" => Ok(PaymentStructure::Deposit50),
            _ => Err(InvoiceError::InvalidValue {
                field: "structure".to_string(),
                value: s.to_string(),
                reason: "use 'full' or 'deposit-50'".to_string(),
            }),
        }
    }
}

/// Due date for the given terms. Custom terms without a date fall back to
/// today.
pub fn due_date(terms: PaymentTerms, custom: Option<NaiveDate>, today: NaiveDate) -> NaiveDate {
    match terms {
        PaymentTerms::DueOnReceipt => today,
        PaymentTerms::Net15 => today.checked_add_days(Days::new(15)).unwrap_or(today),
        PaymentTerms::Net30 => today.checked_add_days(Days::new(30)).unwrap_or(today),
        PaymentTerms::Custom => custom.unwrap_or(today),
    }
}

pub fn terms_label(terms: PaymentTerms, due: NaiveDate) -> String {
    match terms {
        PaymentTerms::DueOnReceipt => "Due Upon Receipt".to_string(),
        PaymentTerms::Net15 => "Net 15".to_string(),
        PaymentTerms::Net30 => "Net 30".to_string(),
        PaymentTerms::Custom => format!("Due by {}", display_date(due)),
    }
}

/// Split `remaining` into a half deposit rounded to the cent and the
/// balance. The balance is taken by subtraction, so both halves add back up
/// to `remaining` even when it carries a fraction of a cent.
pub fn split_deposit(remaining: f64) -> (f64, f64) {
    let deposit = (remaining * 0.5 * 100.0).round() / 100.0;
    (deposit, remaining - deposit)
}

/// Inputs for [`build_schedule`]
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    pub structure: PaymentStructure,
    pub total: f64,
    pub initial_payment: f64,
    pub deposit_date: NaiveDate,
    pub balance_date: NaiveDate,
}

/// Installments for the requested structure; empty for [`PaymentStructure::Full`]
pub fn build_schedule(request: &ScheduleRequest) -> Vec<InvoiceSchedule> {
    match request.structure {
        PaymentStructure::Full => Vec::new(),
        PaymentStructure::Deposit50 => {
            let remaining = request.total - request.initial_payment;
            let (deposit, balance) = split_deposit(remaining);
            vec![
                InvoiceSchedule {
                    id: Uuid::new_v4().to_string(),
                    label: DEPOSIT_LABEL.to_string(),
                    date: request.deposit_date,
                    amount: deposit,
                },
                InvoiceSchedule {
                    id: Uuid::new_v4().to_string(),
                    label: BALANCE_LABEL.to_string(),
                    date: request.balance_date,
                    amount: balance,
                },
            ]
        }
    }
}
