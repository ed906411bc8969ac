pub mod config;
pub mod email;
pub mod error;
pub mod invoice;
pub mod pdf;

pub use config::{Config, Invoice, Ledger, LogEntry, LogKind, Project, Store};
pub use error::{InvoiceError, Result};
pub use invoice::{draft_invoice, save_invoice, InvoiceDocument, InvoiceRequest};
