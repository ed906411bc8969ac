use chrono::NaiveDate;

use crate::config::Invoice;

/// Letters of the client name, first three, upper-cased.
/// A name without letters yields an empty code.
pub fn client_code(client: &str) -> String {
    client
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(3)
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Next invoice number: `{prefix}-{CODE}-{yymm}-{seq:02}`.
///
/// The sequence counts existing invoices sharing the same
/// `{prefix}-{CODE}-{yymm}` stem. It is a plain read of current state with no
/// reservation, so two writers creating invoices for the same client and
/// month at once can end up with the same number.
///
/// Without a client the result is `{prefix}-DRAFT`, which is for previews
/// only.
pub fn invoice_number(
    prefix: &str,
    client: Option<&str>,
    created: NaiveDate,
    existing: &[Invoice],
) -> String {
    let client = match client {
        Some(c) if !c.is_empty() => c,
        _ => return draft_number(prefix),
    };

    let stem = format!(
        "{}-{}-{}",
        prefix,
        client_code(client),
        created.format("%y%m")
    );
    let count = existing
        .iter()
        .filter(|i| i.invoice_number.starts_with(&stem))
        .count();

    format!("{}-{:02}", stem, count + 1)
}

pub fn draft_number(prefix: &str) -> String {
    format!("{prefix}-DRAFT")
}
