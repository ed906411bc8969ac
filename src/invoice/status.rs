use chrono::{DateTime, NaiveDate, Utc};

use crate::config::InvoiceStatus;

/// Absolute tolerance for "is this fully paid" comparisons
pub const AMOUNT_TOLERANCE: f64 = 0.01;

const SECONDS_PER_DAY: i64 = 86_400;

/// Status from the invoice total and the sum of all recorded payments
pub fn derive_status(total: f64, paid: f64) -> InvoiceStatus {
    if paid >= total - AMOUNT_TOLERANCE {
        InvoiceStatus::Paid
    } else if paid > 0.0 {
        InvoiceStatus::Partial
    } else {
        InvoiceStatus::Sent
    }
}

/// Whole days past due, rounded up, counted from midnight UTC of the due
/// date. Zero when not yet due.
pub fn overdue_days(due: NaiveDate, now: DateTime<Utc>) -> i64 {
    let due_start = due.and_time(chrono::NaiveTime::MIN).and_utc();
    let elapsed = (now - due_start).num_seconds();
    if elapsed <= 0 {
        0
    } else {
        (elapsed + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
    }
}
