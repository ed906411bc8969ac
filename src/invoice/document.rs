use serde::Serialize;

use super::lines::display_date;
use super::schedule::terms_label;
use crate::config::{Company, Config, Invoice, Ledger};

/// A line as printed
#[derive(Debug, Serialize)]
pub struct DocumentLine {
    pub description: String,
    pub dates: String,
    pub quantity: f64,
    pub rate: f64,
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct DocumentInstallment {
    pub label: String,
    pub date: String,
    pub amount: f64,
}

/// Bill-to block. Contact details come from the client's first project that
/// has them.
#[derive(Debug, Serialize, Default)]
pub struct BillTo {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Complete data for rendering an invoice PDF
#[derive(Debug, Serialize)]
pub struct InvoiceDocument {
    pub number: String,
    pub date: String,
    pub due_date: String,
    pub terms: String,
    pub company: Company,
    pub bill_to: BillTo,
    pub items: Vec<DocumentLine>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub paid: f64,
    pub balance_due: f64,
    pub schedule: Vec<DocumentInstallment>,
    pub status: String,
    pub currency_symbol: String,
}

fn bill_to(client: &str, ledger: &Ledger) -> BillTo {
    let projects: Vec<_> = ledger.projects.iter().filter(|p| p.client == client).collect();
    BillTo {
        name: client.to_string(),
        email: projects.iter().find_map(|p| p.email.clone()),
        phone: projects.iter().find_map(|p| p.phone.clone()),
        address: projects.iter().find_map(|p| p.address.clone()),
    }
}

impl InvoiceDocument {
    pub fn new(invoice: &Invoice, config: &Config, ledger: &Ledger) -> Self {
        Self {
            number: invoice.invoice_number.clone(),
            date: display_date(invoice.date),
            due_date: display_date(invoice.due_date),
            terms: terms_label(invoice.terms, invoice.due_date),
            company: config.company.clone(),
            bill_to: bill_to(&invoice.client_id, ledger),
            items: invoice
                .items
                .iter()
                .map(|i| DocumentLine {
                    description: i.description.clone(),
                    dates: i.dates.clone().unwrap_or_default(),
                    quantity: i.quantity,
                    rate: i.rate,
                    amount: i.amount,
                })
                .collect(),
            subtotal: invoice.subtotal,
            tax: invoice.tax,
            total: invoice.total,
            paid: invoice.paid_amount(),
            balance_due: invoice.balance_due(),
            schedule: invoice
                .payment_schedule
                .iter()
                .flatten()
                .map(|s| DocumentInstallment {
                    label: s.label.clone(),
                    date: display_date(s.date),
                    amount: s.amount,
                })
                .collect(),
            status: invoice.status.to_string(),
            currency_symbol: config.invoice.currency_symbol.clone(),
        }
    }
}
