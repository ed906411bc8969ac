use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::log::LogType;
use crate::error::InvoiceError;

/// Lifecycle status, always derived from recorded payments.
///
/// Ordering is the status rank: appending a payment never moves an invoice
/// to a lower variant.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Partial,
    Paid,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceStatus::Draft => write!(f, "DRAFT"),
            InvoiceStatus::Sent => write!(f, "SENT"),
            InvoiceStatus::Partial => write!(f, "PARTIAL"),
            InvoiceStatus::Paid => write!(f, "PAID"),
        }
    }
}

/// Due-date policy
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentTerms {
    #[default]
    DueOnReceipt,
    Net15,
    Net30,
    Custom,
}

impl fmt::Display for PaymentTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentTerms::DueOnReceipt => write!(f, "DUE_ON_RECEIPT"),
            PaymentTerms::Net15 => write!(f, "NET_15"),
            PaymentTerms::Net30 => write!(f, "NET_30"),
            PaymentTerms::Custom => write!(f, "CUSTOM"),
        }
    }
}

impl FromStr for PaymentTerms {
    type Err = InvoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "DUE_ON_RECEIPT" | "RECEIPT" => Ok(PaymentTerms::DueOnReceipt),
            "NET_15" | "NET15" => Ok(PaymentTerms::Net15),
            "NET_30" | "NET30" => Ok(PaymentTerms::Net30),
            "CUSTOM" => Ok(PaymentTerms::Custom),
            _ => Err(InvoiceError::InvalidValue {
                field: "terms".to_string(),
                value: s.to_string(),
                reason: "use 'due-on-receipt', 'net-15', 'net-30' or 'custom'".to_string(),
            }),
        }
    }
}

/// A line on an invoice. Not stored on its own; lives inside [`Invoice`].
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: f64,
    pub rate: f64,
    pub amount: f64,
    #[serde(rename = "type")]
    pub log_type: LogType,
    /// Back-reference to the log this line was built from
    pub original_log_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InvoicePayment {
    pub id: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One installment of a deposit/balance split
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InvoiceSchedule {
    pub id: String,
    pub label: String,
    pub date: NaiveDate,
    pub amount: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    pub client_id: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub terms: PaymentTerms,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<InvoiceItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_schedule: Option<Vec<InvoiceSchedule>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payments: Vec<InvoicePayment>,
}

impl Invoice {
    pub fn paid_amount(&self) -> f64 {
        self.payments.iter().map(|p| p.amount).sum()
    }

    pub fn balance_due(&self) -> f64 {
        self.total - self.paid_amount()
    }
}

/// Fields the store may change on an existing invoice
#[derive(Debug, Default, Clone)]
pub struct InvoicePatch {
    pub payments: Option<Vec<InvoicePayment>>,
    pub status: Option<InvoiceStatus>,
}
