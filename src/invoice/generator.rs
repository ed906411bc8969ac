use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use super::lines::build_lines;
use super::number::invoice_number;
use super::schedule::{build_schedule, due_date, PaymentStructure, ScheduleRequest};
use super::select::{earliest_check_in, select_logs, LogFilter, Period};
use super::status::derive_status;
use crate::config::{
    Invoice, InvoicePatch, InvoicePayment, InvoiceStatus, Ledger, PaymentTerms, Store,
};
use crate::error::{InvoiceError, Result};

pub const INITIAL_PAYMENT_METHOD: &str = "Pre-payment";
pub const INITIAL_PAYMENT_NOTE: &str = "Initial Payment / Deposit";

/// Everything the user picks when creating an invoice
#[derive(Debug, Clone, Default)]
pub struct InvoiceRequest {
    pub client: Option<String>,
    pub project_id: Option<String>,
    pub period: Period,
    pub terms: PaymentTerms,
    pub custom_due_date: Option<NaiveDate>,
    pub structure: PaymentStructure,
    pub deposit_date: Option<NaiveDate>,
    pub balance_date: Option<NaiveDate>,
    /// Amount already received when the invoice is created
    pub initial_payment: f64,
    pub initial_payment_note: Option<String>,
}

/// Assemble an invoice from the ledger without storing it.
///
/// Refuses to build without a client or without any matching log.
pub fn draft_invoice(
    ledger: &Ledger,
    request: &InvoiceRequest,
    prefix: &str,
    today: NaiveDate,
) -> Result<Invoice> {
    let client = match request.client.as_deref() {
        Some(c) if !c.is_empty() => c,
        _ => return Err(InvoiceError::NoClient),
    };

    if request.initial_payment < 0.0 || !request.initial_payment.is_finite() {
        return Err(InvoiceError::InvalidValue {
            field: "paid".to_string(),
            value: request.initial_payment.to_string(),
            reason: "must be zero or more".to_string(),
        });
    }

    let filter = LogFilter {
        client: client.to_string(),
        project_id: request.project_id.clone(),
        period: request.period,
    };
    let logs = select_logs(ledger, &filter);
    if logs.is_empty() {
        return Err(InvoiceError::NoBillableLogs(client.to_string()));
    }

    let lines = build_lines(&logs, &ledger.projects);
    let tax = 0.0;
    let total = lines.subtotal + tax;

    let due = due_date(request.terms, request.custom_due_date, today);
    let schedule = build_schedule(&ScheduleRequest {
        structure: request.structure,
        total,
        initial_payment: request.initial_payment,
        deposit_date: request.deposit_date.unwrap_or(today),
        balance_date: request
            .balance_date
            .or_else(|| earliest_check_in(&logs))
            .unwrap_or(due),
    });

    let mut payments = Vec::new();
    if request.initial_payment > 0.0 {
        payments.push(InvoicePayment {
            id: Uuid::new_v4().to_string(),
            date: today,
            amount: request.initial_payment,
            method: INITIAL_PAYMENT_METHOD.to_string(),
            note: Some(
                request
                    .initial_payment_note
                    .clone()
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| INITIAL_PAYMENT_NOTE.to_string()),
            ),
        });
    }
    let paid: f64 = payments.iter().map(|p| p.amount).sum();

    Ok(Invoice {
        id: Uuid::new_v4().to_string(),
        invoice_number: invoice_number(prefix, Some(client), today, &ledger.invoices),
        client_id: client.to_string(),
        date: today,
        due_date: due,
        terms: request.terms,
        subtotal: lines.subtotal,
        tax,
        total,
        status: derive_status(total, paid),
        created_at: Utc::now(),
        items: lines.items,
        payment_schedule: if schedule.is_empty() {
            None
        } else {
            Some(schedule)
        },
        payments,
    })
}

/// Build and persist a new invoice. This is the only path that creates one.
pub fn save_invoice<S: Store>(
    store: &S,
    request: &InvoiceRequest,
    prefix: &str,
    today: NaiveDate,
) -> Result<Invoice> {
    let mut ledger = store.load()?;
    let invoice = draft_invoice(&ledger, request, prefix, today)?;
    ledger.add_invoice(invoice.clone());
    store.save(&ledger)?;

    info!(
        number = %invoice.invoice_number,
        total = invoice.total,
        status = %invoice.status,
        "invoice saved"
    );
    Ok(invoice)
}

/// Append a payment and re-derive the status
pub fn record_payment(
    ledger: &mut Ledger,
    invoice_id: &str,
    payment: InvoicePayment,
) -> Result<InvoiceStatus> {
    if payment.amount <= 0.0 || !payment.amount.is_finite() {
        return Err(InvoiceError::InvalidPaymentAmount);
    }

    let invoice = ledger
        .invoice(invoice_id)
        .ok_or_else(|| InvoiceError::InvoiceNotFound(invoice_id.to_string()))?;

    let mut payments = invoice.payments.clone();
    payments.push(payment);
    let status = derive_status(invoice.total, payments.iter().map(|p| p.amount).sum());

    ledger.update_invoice(
        invoice_id,
        InvoicePatch {
            payments: Some(payments),
            status: Some(status),
        },
    )?;
    Ok(status)
}

/// Remove a payment (1-based index, default last) and re-derive the status
pub fn remove_payment(
    ledger: &mut Ledger,
    invoice_id: &str,
    index: Option<usize>,
) -> Result<InvoicePayment> {
    let invoice = ledger
        .invoice(invoice_id)
        .ok_or_else(|| InvoiceError::InvoiceNotFound(invoice_id.to_string()))?;

    if invoice.payments.is_empty() {
        return Err(InvoiceError::NoPayments(invoice.invoice_number.clone()));
    }

    let remove_idx = match index {
        Some(i) if i == 0 || i > invoice.payments.len() => {
            return Err(InvoiceError::InvalidPaymentIndex {
                invoice: invoice.invoice_number.clone(),
                index: i,
                count: invoice.payments.len(),
            });
        }
        Some(i) => i - 1,
        None => invoice.payments.len() - 1,
    };

    let mut payments = invoice.payments.clone();
    let removed = payments.remove(remove_idx);
    let status = derive_status(invoice.total, payments.iter().map(|p| p.amount).sum());

    ledger.update_invoice(
        invoice_id,
        InvoicePatch {
            payments: Some(payments),
            status: Some(status),
        },
    )?;
    Ok(removed)
}
