mod document;
mod generator;
mod lines;
mod number;
pub mod rate;
mod schedule;
mod select;
mod status;

pub use document::{BillTo, DocumentInstallment, DocumentLine, InvoiceDocument};
pub use generator::{
    draft_invoice, record_payment, remove_payment, save_invoice, InvoiceRequest,
    INITIAL_PAYMENT_METHOD, INITIAL_PAYMENT_NOTE,
};
pub use lines::{build_lines, display_date, InvoiceLines};
pub use number::{client_code, draft_number, invoice_number};
pub use rate::{billable_amount, expense_amounts, nights, stay_amount, stay_quantity};
pub use schedule::{
    build_schedule, due_date, split_deposit, terms_label, PaymentStructure, ScheduleRequest,
    BALANCE_LABEL, DEPOSIT_LABEL,
};
pub use select::{client_directory, client_of, earliest_check_in, select_logs, LogFilter, Period};
pub use status::{derive_status, overdue_days, AMOUNT_TOLERANCE};
