use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{InvoiceError, Result};
use crate::invoice::InvoiceDocument;

/// Embedded Typst template for invoice generation
/// Uses a placeholder that gets replaced with the actual JSON file path
const INVOICE_TEMPLATE: &str = r##"// Invoice Template
// Data is loaded from JSON file

#let data = json("DATA_JSON_PATH")

#set page(
  paper: "us-letter",
  margin: (top: 0.8in, bottom: 0.8in, left: 0.9in, right: 0.9in),
)

#set text(font: "Helvetica", size: 9.5pt)

#let fmt-int(digits) = {
  let len = digits.len()
  let out = ""
  for (i, digit) in digits.clusters().enumerate() {
    if i > 0 and calc.rem(len - i, 3) == 0 {
      out += ","
    }
    out += digit
  }
  out
}

#let fmt-currency(amount) = {
  let negative = amount < 0
  let parts = str(calc.round(calc.abs(amount), digits: 2)).split(".")
  let whole = fmt-int(parts.at(0))
  let frac = if parts.len() > 1 { parts.at(1) } else { "00" }
  let frac2 = if frac.len() == 1 { frac + "0" } else { frac }
  (if negative { "-" } else { "" }) + data.currency_symbol + whole + "." + frac2
}

#let fmt-qty(q) = if calc.fract(q) == 0 { str(int(q)) } else { str(q) }

// Company identity and invoice details
#grid(
  columns: (1fr, 1fr),
  align: (left, right),
  [
    #text(size: 18pt, weight: "bold")[#data.company.name]
    #v(0.3em)
    #for line in data.company.address [
      #line \
    ]
    #data.company.email
    #if data.company.phone != none [
      \ #data.company.phone
    ]
  ],
  [
    #text(size: 24pt, weight: "bold")[INVOICE]
    #v(0.5em)
    #table(
      columns: (auto, auto),
      stroke: none,
      align: (right, left),
      inset: 2pt,
      [*Invoice \#:*], [#data.number],
      [*Date:*], [#data.date],
      [*Due Date:*], [#data.due_date],
      [*Terms:*], [#data.terms],
    )
  ]
)

#v(1em)
#line(length: 100%, stroke: 0.5pt + gray)
#v(1em)

// Bill To
#text(weight: "bold", size: 11pt)[Bill To:]
#v(0.3em)
#text(weight: "bold")[#data.bill_to.name]
#if data.bill_to.address != none [
  \ #data.bill_to.address
]
#if data.bill_to.email != none [
  \ #data.bill_to.email
]
#if data.bill_to.phone != none [
  \ #data.bill_to.phone
]

#v(1.5em)

// Line items
#table(
  columns: (1fr, auto, auto, auto, auto),
  align: (left, left, right, right, right),
  stroke: (x, y) => if y == 0 { (bottom: 1pt + black) } else if y > 0 { (bottom: 0.5pt + gray) },
  inset: 7pt,
  fill: (x, y) => if y == 0 { luma(240) } else { none },

  [*Description*], [*Dates*], [*Qty*], [*Rate*], [*Amount*],

  ..data.items.map(item => (
    item.description,
    text(fill: gray)[#item.dates],
    fmt-qty(item.quantity),
    [#fmt-currency(item.rate)],
    [#fmt-currency(item.amount)],
  )).flatten()
)

#v(1em)

// Totals
#align(right)[
  #table(
    columns: (auto, auto),
    stroke: none,
    align: (right, right),
    inset: 5pt,

    [Subtotal:], [#fmt-currency(data.subtotal)],
    [Tax:], [#fmt-currency(data.tax)],
    table.hline(stroke: 1pt),
    [*Total:*], [*#fmt-currency(data.total)*],

    ..if data.paid > 0 {
      (
        [Payment Received:], [-#fmt-currency(data.paid)],
        [*Balance Due:*], [*#fmt-currency(data.balance_due)*],
      )
    } else {
      ()
    },
  )
]

// Payment schedule
#if data.schedule.len() > 0 [
  #v(1.5em)
  #text(weight: "bold", size: 11pt)[Payment Schedule]
  #v(0.3em)
  #table(
    columns: (1fr, auto, auto),
    align: (left, left, right),
    stroke: (x, y) => if y == 0 { (bottom: 1pt + black) } else { (bottom: 0.5pt + gray) },
    inset: 7pt,
    [*Installment*], [*Due*], [*Amount*],
    ..data.schedule.map(s => (s.label, s.date, [#fmt-currency(s.amount)])).flatten()
  )
]

// Remittance
#v(2em)
#line(length: 100%, stroke: 0.5pt + gray)
#v(0.5em)
#text(weight: "bold")[Remit Payment To]
#v(0.2em)
#text(size: 9pt)[
  #data.company.bank.beneficiary \
  #data.company.bank.name \
  #data.company.bank.address \
  Routing No: #data.company.bank.routing #h(1em) Account No: #data.company.bank.account
]
"##;

/// Generate PDF using Typst CLI
pub fn generate_pdf(document: &InvoiceDocument, output_path: &Path) -> Result<()> {
    // Check if typst is available
    let typst_check = Command::new("typst").arg("--version").output();

    if typst_check.is_err() {
        return Err(InvoiceError::TypstNotFound);
    }

    // Create temp directory for template
    let temp_dir = std::env::temp_dir().join("stay-billing");
    std::fs::create_dir_all(&temp_dir)?;

    let json_data = serde_json::to_string(document)
        .map_err(|e| InvoiceError::PdfGeneration(e.to_string()))?;

    let json_path = temp_dir.join("data.json");
    std::fs::write(&json_path, &json_data)?;

    // data.json sits next to the template, so the path stays relative
    let template_content = INVOICE_TEMPLATE.replace("DATA_JSON_PATH", "data.json");
    let template_path = temp_dir.join("invoice.typ");
    std::fs::write(&template_path, &template_content)?;

    debug!(number = %document.number, output = %output_path.display(), "running typst");

    let output = Command::new("typst")
        .arg("compile")
        .arg("--root")
        .arg(&temp_dir)
        .arg(&template_path)
        .arg(output_path)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(InvoiceError::PdfGeneration(stderr.to_string()));
    }

    // Clean up temp files
    let _ = std::fs::remove_file(&template_path);
    let _ = std::fs::remove_file(&json_path);

    Ok(())
}
