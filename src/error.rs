use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvoiceError {
    #[error("Config directory not found at {0}. Run 'stay-billing init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to parse state file {path}: {source}")]
    StateParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write state file: {0}")]
    StateSerialize(#[from] toml::ser::Error),

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    #[error("Log entry '{0}' not found")]
    LogNotFound(String),

    #[error("Invoice '{0}' not found")]
    InvoiceNotFound(String),

    #[error("Invalid invoice index '{0}'. Use 'stay-billing list' to see available invoices.")]
    InvalidInvoiceIndex(String),

    #[error("No client selected. Use --client <name> to pick who is billed.")]
    NoClient,

    #[error("No billable logs found for client '{0}' with the given filters")]
    NoBillableLogs(String),

    #[error("Payment amount must be greater than zero")]
    InvalidPaymentAmount,

    #[error("No payments recorded for {0}")]
    NoPayments(String),

    #[error("Invalid payment index {index} for {invoice} (only {count} payment(s) recorded)")]
    InvalidPaymentIndex {
        invoice: String,
        index: usize,
        count: usize,
    },

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("Email drafting failed: {0}")]
    EmailDraft(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InvoiceError>;
