use chrono::{Datelike, Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use stay_billing::config::{
    config_dir, load_config, resolve_output_dir, FileStore, Invoice, InvoicePayment,
    InvoiceStatus, Ledger, LogEntry, LogKind, LogPatch, PaymentTerms, Project, ProjectStatus,
    StayPricing, Store, CONFIG_TEMPLATE,
};
use stay_billing::email::{draft_or_none, HttpDrafter};
use stay_billing::error::{InvoiceError, Result};
use stay_billing::invoice::{
    billable_amount, client_directory, display_date, draft_invoice, invoice_number,
    overdue_days, record_payment, remove_payment, save_invoice, terms_label, InvoiceDocument,
    InvoiceRequest, Period,
};
use stay_billing::pdf::generate_pdf;

#[derive(Parser)]
#[command(name = "stay-billing")]
#[command(version, about = "Track stays, hours and expenses, then invoice them", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.stay-billing or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config
    Init,

    /// Add a project (property or engagement)
    AddProject {
        #[arg(short, long)]
        name: String,

        /// Client billed for this project
        #[arg(short, long)]
        client: String,

        /// Hourly rate for time entries
        #[arg(short, long)]
        rate: f64,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        address: Option<String>,
    },

    /// List projects
    Projects,

    /// Change a project's status
    ProjectStatus {
        /// Project id or name
        project: String,

        /// active, archived or completed
        status: String,
    },

    /// Log hourly work
    LogTime {
        /// Project id or name
        #[arg(short, long)]
        project: String,

        #[arg(long)]
        hours: f64,

        #[command(flatten)]
        common: LogArgs,
    },

    /// Log an expense with markup
    LogExpense {
        /// Project id or name
        #[arg(short, long)]
        project: String,

        #[arg(long)]
        cost: f64,

        /// Markup percentage added to the cost
        #[arg(long, default_value_t = 20.0)]
        markup: f64,

        #[command(flatten)]
        common: LogArgs,
    },

    /// Log a guest stay
    LogStay {
        /// Project (property) id or name
        #[arg(short, long)]
        project: String,

        /// Guest name, billed as the client
        #[arg(short, long)]
        guest: String,

        /// Check-in date (YYYY-MM-DD)
        #[arg(long)]
        check_in: String,

        /// Check-out date (YYYY-MM-DD)
        #[arg(long)]
        check_out: String,

        /// Nightly rate, or the whole fee with --flat
        #[arg(long)]
        rate: f64,

        /// Treat --rate as a flat fee for the stay
        #[arg(long)]
        flat: bool,

        /// Entry date (default: today)
        #[arg(long)]
        date: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// List recent logs
    Logs {
        /// Number of logs to show (default: 10)
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Edit a log entry; amounts are re-derived
    EditLog {
        /// Log id (or unique prefix from 'logs')
        log: String,

        #[arg(long)]
        project: Option<String>,

        /// Client override (empty string clears it)
        #[arg(long)]
        client: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        hours: Option<f64>,

        #[arg(long)]
        cost: Option<f64>,

        #[arg(long)]
        markup: Option<f64>,

        #[arg(long)]
        check_in: Option<String>,

        #[arg(long)]
        check_out: Option<String>,

        #[arg(long)]
        rate: Option<f64>,

        /// nightly or flat
        #[arg(long)]
        pricing: Option<String>,
    },

    /// Delete a log entry
    DeleteLog {
        /// Log id (or unique prefix from 'logs')
        log: String,
    },

    /// List known clients
    Clients,

    /// Show the invoice that would be generated, without saving it
    Preview {
        #[command(flatten)]
        invoice: InvoiceArgs,
    },

    /// Generate and save a new invoice
    Generate {
        #[command(flatten)]
        invoice: InvoiceArgs,

        /// Also render the PDF
        #[arg(long)]
        pdf: bool,

        /// Open the rendered PDF (implies --pdf)
        #[arg(long)]
        open: bool,
    },

    /// List saved invoices
    List {
        /// Number of invoices to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Render an invoice PDF from stored data
    Render {
        /// Invoice number or index from 'list' (e.g., 1 or INV-SMI-2405-01)
        invoice: String,

        /// Open the PDF with the system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Record a payment against an invoice
    AddPayment {
        /// Invoice number or index from 'list'
        invoice: String,

        /// Payment amount
        amount: f64,

        /// Payment date (default: today)
        #[arg(long)]
        date: Option<String>,

        #[arg(long, default_value = "Credit Card")]
        method: String,

        #[arg(long)]
        note: Option<String>,
    },

    /// Remove a payment from an invoice
    RemovePayment {
        /// Invoice number or index from 'list'
        invoice: String,

        /// 1-based index of payment to remove (default: last)
        #[arg(long)]
        index: Option<usize>,
    },

    /// Show payment history for an invoice
    Payments {
        /// Invoice number or index from 'list'
        invoice: String,
    },

    /// Draft a cover email for an invoice
    DraftEmail {
        /// Invoice number or index from 'list'
        invoice: String,
    },

    /// Show ledger status and the next invoice number
    Status {
        /// Client to compute the next invoice number for
        #[arg(short, long)]
        client: Option<String>,
    },
}

#[derive(Args)]
struct LogArgs {
    /// Entry date (default: today)
    #[arg(long)]
    date: Option<String>,

    #[arg(short, long, default_value = "")]
    description: String,

    /// Bill this entry to a different client than the project's
    #[arg(long)]
    client: Option<String>,
}

#[derive(Args)]
struct InvoiceArgs {
    /// Client to invoice
    #[arg(short, long)]
    client: Option<String>,

    /// Limit to one project (id or name)
    #[arg(short, long)]
    project: Option<String>,

    /// Only logs from this month (YYYY-MM)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    month: Option<String>,

    /// Range start (YYYY-MM-DD), used together with --to
    #[arg(long)]
    from: Option<String>,

    /// Range end (YYYY-MM-DD), used together with --from
    #[arg(long)]
    to: Option<String>,

    /// due-on-receipt, net-15, net-30 or custom (default from config)
    #[arg(long)]
    terms: Option<String>,

    /// Due date for custom terms (YYYY-MM-DD)
    #[arg(long)]
    due: Option<String>,

    /// full or deposit-50
    #[arg(long, default_value = "full")]
    structure: String,

    /// Deposit due date (default: today)
    #[arg(long)]
    deposit_date: Option<String>,

    /// Balance due date (default: earliest check-in)
    #[arg(long)]
    balance_date: Option<String>,

    /// Amount already received
    #[arg(long, default_value_t = 0.0)]
    paid: f64,

    /// Note for the amount already received
    #[arg(long)]
    paid_note: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::AddProject {
            name,
            client,
            rate,
            email,
            phone,
            address,
        } => cmd_add_project(&cfg_dir, name, client, rate, email, phone, address),
        Commands::Projects => cmd_projects(&cfg_dir),
        Commands::ProjectStatus { project, status } => {
            cmd_project_status(&cfg_dir, &project, &status)
        }
        Commands::LogTime {
            project,
            hours,
            common,
        } => cmd_add_log(&cfg_dir, &project, common, LogKind::time(hours)),
        Commands::LogExpense {
            project,
            cost,
            markup,
            common,
        } => cmd_add_log(&cfg_dir, &project, common, LogKind::expense(cost, markup)),
        Commands::LogStay {
            project,
            guest,
            check_in,
            check_out,
            rate,
            flat,
            date,
            description,
        } => {
            let check_in = parse_date(&check_in)?;
            let check_out = parse_date(&check_out)?;
            let pricing = if flat {
                StayPricing::Flat
            } else {
                StayPricing::Nightly
            };
            let description = description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| format!("Stay: {guest}"));
            let common = LogArgs {
                date,
                description,
                client: Some(guest),
            };
            cmd_add_log(
                &cfg_dir,
                &project,
                common,
                LogKind::stay(check_in, check_out, rate, pricing),
            )
        }
        Commands::Logs { limit } => cmd_logs(&cfg_dir, limit),
        Commands::EditLog {
            log,
            project,
            client,
            date,
            description,
            hours,
            cost,
            markup,
            check_in,
            check_out,
            rate,
            pricing,
        } => {
            let patch = LogPatch {
                project_id: None,
                client,
                date: date.as_deref().map(parse_date).transpose()?,
                description,
                hours,
                cost,
                markup_percent: markup,
                check_in: check_in.as_deref().map(parse_date).transpose()?,
                check_out: check_out.as_deref().map(parse_date).transpose()?,
                rate,
                pricing: pricing
                    .as_deref()
                    .map(str::parse::<StayPricing>)
                    .transpose()?,
            };
            cmd_edit_log(&cfg_dir, &log, project.as_deref(), patch)
        }
        Commands::DeleteLog { log } => cmd_delete_log(&cfg_dir, &log),
        Commands::Clients => cmd_clients(&cfg_dir),
        Commands::Preview { invoice } => cmd_preview(&cfg_dir, &invoice),
        Commands::Generate { invoice, pdf, open } => {
            cmd_generate(&cfg_dir, &invoice, pdf || open, open)
        }
        Commands::List { limit } => cmd_invoices(&cfg_dir, limit),
        Commands::Render { invoice, open } => cmd_render(&cfg_dir, &invoice, open),
        Commands::AddPayment {
            invoice,
            amount,
            date,
            method,
            note,
        } => cmd_add_payment(&cfg_dir, &invoice, amount, date, method, note),
        Commands::RemovePayment { invoice, index } => {
            cmd_remove_payment(&cfg_dir, &invoice, index)
        }
        Commands::Payments { invoice } => cmd_payments(&cfg_dir, &invoice),
        Commands::DraftEmail { invoice } => cmd_draft_email(&cfg_dir, &invoice),
        Commands::Status { client } => cmd_status(&cfg_dir, client.as_deref()),
    }
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> InvoiceError {
    InvoiceError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| InvoiceError::InvalidDate(s.to_string()))
}

fn parse_month(s: &str) -> Result<Period> {
    let first = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .map_err(|_| invalid("month", s, "expected YYYY-MM"))?;
    Ok(Period::Month {
        year: first.year(),
        month: first.month(),
    })
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn open_store(cfg_dir: &Path) -> Result<FileStore> {
    if !cfg_dir.exists() {
        return Err(InvoiceError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    Ok(FileStore::new(cfg_dir))
}

/// Resolve a project by id or (case-insensitive) name
fn resolve_project<'a>(ledger: &'a Ledger, reference: &str) -> Result<&'a Project> {
    ledger
        .project(reference)
        .or_else(|| {
            ledger
                .projects
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(reference))
        })
        .ok_or_else(|| InvoiceError::ProjectNotFound(reference.to_string()))
}

/// Resolve a log by id or unique id prefix
fn resolve_log(ledger: &Ledger, reference: &str) -> Result<String> {
    if let Some(log) = ledger.log(reference) {
        return Ok(log.id.clone());
    }
    let matches: Vec<&LogEntry> = ledger
        .logs
        .iter()
        .filter(|l| l.id.starts_with(reference))
        .collect();
    match matches.as_slice() {
        [log] => Ok(log.id.clone()),
        _ => Err(InvoiceError::LogNotFound(reference.to_string())),
    }
}

/// Resolve an invoice reference to its id.
/// Accepts either an index (1-based) from 'list' or the full invoice number.
fn resolve_invoice(ledger: &Ledger, reference: &str) -> Result<String> {
    // Try to parse as an index first
    if let Ok(idx) = reference.parse::<usize>() {
        // Invoices are displayed in reverse order (newest first), 1-indexed
        if idx == 0 || idx > ledger.invoices.len() {
            return Err(InvoiceError::InvalidInvoiceIndex(reference.to_string()));
        }
        return Ok(ledger.invoices[ledger.invoices.len() - idx].id.clone());
    }

    ledger
        .invoice_by_number(reference)
        .map(|i| i.id.clone())
        .ok_or_else(|| InvoiceError::InvoiceNotFound(reference.to_string()))
}

fn find_invoice<'a>(ledger: &'a Ledger, id: &str) -> Result<&'a Invoice> {
    ledger
        .invoice(id)
        .ok_or_else(|| InvoiceError::InvoiceNotFound(id.to_string()))
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(InvoiceError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    FileStore::new(cfg_dir).save(&Ledger::default())?;

    println!("Initialized billing config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your company and bank details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Add a property or engagement:        stay-billing add-project --name <name> --client <client> --rate <hourly>");
    println!("  3. Log stays, hours and expenses:       stay-billing log-stay | log-time | log-expense");
    println!();
    println!("Then invoice a client:");
    println!("  stay-billing generate --client <client>");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CLIENT")]
    client: String,
    #[tabled(rename = "RATE")]
    rate: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "TYPE")]
    log_type: String,
    #[tabled(rename = "ENTRY")]
    entry: String,
    #[tabled(rename = "PROJECT")]
    project: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "DATES")]
    dates: String,
    #[tabled(rename = "QTY")]
    quantity: String,
    #[tabled(rename = "RATE")]
    rate: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

#[derive(Tabled)]
struct ScheduleRow {
    #[tabled(rename = "INSTALLMENT")]
    label: String,
    #[tabled(rename = "DUE")]
    date: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DUE")]
    due: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "CLIENT")]
    client: String,
}

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "METHOD")]
    method: String,
    #[tabled(rename = "NOTE")]
    note: String,
}

fn format_grouped_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Format a money amount with two decimal places and thousands separators
fn format_money(value: f64, currency_symbol: &str) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    format!(
        "{}{}{}.{:02}",
        sign,
        currency_symbol,
        format_grouped_int(cents / 100),
        cents % 100
    )
}

fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{quantity:.0}")
    } else {
        quantity.to_string()
    }
}

fn add_financial_footer(table: &str, total: &str, paid: &str, outstanding: &str) -> String {
    let lines: Vec<&str> = table.lines().collect();
    if lines.len() < 4 {
        return table.to_string();
    }

    // Parse the top border to discover column widths
    let top = lines[0];
    let Some(inner) = top.strip_prefix('╭').and_then(|s| s.strip_suffix('╮')) else {
        return table.to_string();
    };

    let widths: Vec<usize> = inner.split('┬').map(|p| p.chars().count()).collect();
    if widths.len() < 6 {
        return table.to_string();
    }

    // Merge columns #, NUMBER, DUE into one label cell; keep TOTAL; close STATUS and CLIENT
    let left_width = widths[0] + widths[1] + widths[2] + 2;
    let total_width = widths[3];

    let rows = [
        ("TOTAL", total),
        ("(-) PAID", paid),
        ("(=) OUTSTANDING", outstanding),
    ];

    let mut out = lines[..lines.len() - 1].join("\n");
    out.push('\n');

    out.push_str(&format!(
        "├{}┴{}┴{}┼{}┼{}┴{}╯\n",
        "─".repeat(widths[0]),
        "─".repeat(widths[1]),
        "─".repeat(widths[2]),
        "─".repeat(total_width),
        "─".repeat(widths[4]),
        "─".repeat(widths[5]),
    ));

    for (idx, (label, value)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "│ {:>left$} │ {:>total$} │\n",
            label,
            value,
            left = left_width - 2,
            total = total_width - 2
        ));
        if idx < rows.len() - 1 {
            out.push_str(&format!(
                "├{}┼{}┤\n",
                "─".repeat(left_width),
                "─".repeat(total_width)
            ));
        }
    }

    out.push_str(&format!(
        "╰{}┴{}╯",
        "─".repeat(left_width),
        "─".repeat(total_width)
    ));

    out
}

fn cmd_add_project(
    cfg_dir: &Path,
    name: String,
    client: String,
    rate: f64,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
) -> Result<()> {
    let store = open_store(cfg_dir)?;
    if rate < 0.0 {
        return Err(invalid("rate", rate, "must be zero or more"));
    }

    let mut ledger = store.load()?;
    let id = ledger.add_project(Project {
        id: Uuid::new_v4().to_string(),
        name: name.clone(),
        client: client.clone(),
        email,
        phone,
        address,
        hourly_rate: rate,
        status: ProjectStatus::Active,
        created_at: Utc::now(),
    });
    store.save(&ledger)?;

    println!("Added project {} for {}", name, client);
    println!("  ID: {}", id);
    Ok(())
}

fn cmd_projects(cfg_dir: &Path) -> Result<()> {
    let store = open_store(cfg_dir)?;
    let config = load_config(cfg_dir)?;
    let ledger = store.load()?;

    if ledger.projects.is_empty() {
        println!("No projects yet. Add one with 'stay-billing add-project'.");
        return Ok(());
    }

    let rows: Vec<ProjectRow> = ledger
        .projects
        .iter()
        .map(|p| ProjectRow {
            id: p.id.clone(),
            name: p.name.clone(),
            client: p.client.clone(),
            rate: format!("{}/h", format_money(p.hourly_rate, &config.invoice.currency_symbol)),
            status: p.status.to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}

fn cmd_project_status(cfg_dir: &Path, reference: &str, status: &str) -> Result<()> {
    let store = open_store(cfg_dir)?;
    let status: ProjectStatus = status.parse()?;
    let mut ledger = store.load()?;

    let project = resolve_project(&ledger, reference)?;
    let (id, name) = (project.id.clone(), project.name.clone());
    ledger.update_project_status(&id, status)?;
    store.save(&ledger)?;

    println!("Marked {} as {}", name, status);
    Ok(())
}

fn cmd_add_log(cfg_dir: &Path, project_ref: &str, common: LogArgs, kind: LogKind) -> Result<()> {
    let store = open_store(cfg_dir)?;
    kind.validate()?;
    let config = load_config(cfg_dir)?;
    let mut ledger = store.load()?;

    let project_id = resolve_project(&ledger, project_ref)?.id.clone();
    let date = match common.date {
        Some(d) => parse_date(&d)?,
        None => today(),
    };

    let log = LogEntry {
        id: Uuid::new_v4().to_string(),
        project_id,
        client: common.client.filter(|c| !c.is_empty()),
        date,
        description: common.description,
        created_at: Utc::now(),
        kind,
    };
    let summary = log_summary(&log, &ledger, &config.invoice.currency_symbol);
    let id = ledger.add_log(log);
    store.save(&ledger)?;

    println!("Logged {}", summary);
    println!("  ID: {}", id);
    Ok(())
}

fn log_summary(log: &LogEntry, ledger: &Ledger, symbol: &str) -> String {
    match &log.kind {
        LogKind::Time { hours } => format!(
            "{}h ({})",
            hours,
            format_money(billable_amount(log, &ledger.projects), symbol)
        ),
        LogKind::Expense {
            billable_amount,
            profit,
            ..
        } => format!(
            "expense {} (profit {})",
            format_money(*billable_amount, symbol),
            format_money(*profit, symbol)
        ),
        LogKind::Stay {
            check_in,
            check_out,
            billable_amount,
            ..
        } => format!(
            "stay {} to {} ({})",
            check_in,
            check_out,
            format_money(*billable_amount, symbol)
        ),
    }
}

fn cmd_logs(cfg_dir: &Path, limit: usize) -> Result<()> {
    let store = open_store(cfg_dir)?;
    let config = load_config(cfg_dir)?;
    let ledger = store.load()?;

    if ledger.logs.is_empty() {
        println!("No logs yet.");
        return Ok(());
    }

    let symbol = &config.invoice.currency_symbol;
    let rows: Vec<LogRow> = ledger
        .logs
        .iter()
        .rev()
        .take(limit)
        .map(|log| {
            let entry = match &log.kind {
                LogKind::Stay {
                    check_in,
                    check_out,
                    ..
                } => format!(
                    "{} ({} - {})",
                    log.client.as_deref().unwrap_or(&log.description),
                    check_in,
                    check_out
                ),
                LogKind::Time { hours } => format!("{} ({}h)", log.description, hours),
                LogKind::Expense { .. } => log.description.clone(),
            };
            LogRow {
                id: log.id.chars().take(8).collect(),
                date: log.date.to_string(),
                log_type: log.kind.log_type().to_string(),
                entry,
                project: ledger
                    .project(&log.project_id)
                    .map_or_else(|| "Unknown Property".to_string(), |p| p.name.clone()),
                amount: format_money(billable_amount(log, &ledger.projects), symbol),
            }
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}

fn cmd_edit_log(
    cfg_dir: &Path,
    reference: &str,
    project_ref: Option<&str>,
    mut patch: LogPatch,
) -> Result<()> {
    let store = open_store(cfg_dir)?;
    let mut ledger = store.load()?;

    let id = resolve_log(&ledger, reference)?;
    if let Some(project_ref) = project_ref {
        patch.project_id = Some(resolve_project(&ledger, project_ref)?.id.clone());
    }
    ledger.update_log(&id, patch)?;
    store.save(&ledger)?;

    println!("Updated log {}", id);
    Ok(())
}

fn cmd_delete_log(cfg_dir: &Path, reference: &str) -> Result<()> {
    let store = open_store(cfg_dir)?;
    let mut ledger = store.load()?;

    let id = resolve_log(&ledger, reference)?;
    let removed = ledger.delete_log(&id)?;
    store.save(&ledger)?;

    println!("Deleted {} log from {}", removed.kind.log_type(), removed.date);
    Ok(())
}

fn cmd_clients(cfg_dir: &Path) -> Result<()> {
    let store = open_store(cfg_dir)?;
    let ledger = store.load()?;

    let clients = client_directory(&ledger);
    if clients.is_empty() {
        println!("No clients yet.");
        return Ok(());
    }
    for client in clients {
        println!("{client}");
    }
    Ok(())
}

fn build_request(
    args: &InvoiceArgs,
    ledger: &Ledger,
    default_terms: PaymentTerms,
) -> Result<InvoiceRequest> {
    let period = match (&args.month, &args.from, &args.to) {
        (Some(month), _, _) => parse_month(month)?,
        (None, None, None) => Period::All,
        (None, from, to) => Period::Range {
            start: from.as_deref().map(parse_date).transpose()?,
            end: to.as_deref().map(parse_date).transpose()?,
        },
    };

    let project_id = match &args.project {
        Some(reference) => Some(resolve_project(ledger, reference)?.id.clone()),
        None => None,
    };

    let terms = match &args.terms {
        Some(t) => t.parse()?,
        None => default_terms,
    };

    Ok(InvoiceRequest {
        client: args.client.clone(),
        project_id,
        period,
        terms,
        custom_due_date: args.due.as_deref().map(parse_date).transpose()?,
        structure: args.structure.parse()?,
        deposit_date: args.deposit_date.as_deref().map(parse_date).transpose()?,
        balance_date: args.balance_date.as_deref().map(parse_date).transpose()?,
        initial_payment: args.paid,
        initial_payment_note: args.paid_note.clone(),
    })
}

fn print_invoice(invoice: &Invoice, symbol: &str) {
    println!("Invoice #{}", invoice.invoice_number);
    println!("  Bill to: {}", invoice.client_id);
    println!("  Date:    {}", display_date(invoice.date));
    println!(
        "  Due:     {} ({})",
        display_date(invoice.due_date),
        terms_label(invoice.terms, invoice.due_date)
    );
    println!();

    let rows: Vec<LineRow> = invoice
        .items
        .iter()
        .map(|i| LineRow {
            description: i.description.clone(),
            dates: i.dates.clone().unwrap_or_default(),
            quantity: format_quantity(i.quantity),
            rate: format_money(i.rate, symbol),
            amount: format_money(i.amount, symbol),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));

    println!("  Subtotal:          {}", format_money(invoice.subtotal, symbol));
    println!("  Tax:               {}", format_money(invoice.tax, symbol));
    println!("  Total:             {}", format_money(invoice.total, symbol));
    let paid = invoice.paid_amount();
    if paid > 0.0 {
        println!("  Payment Received: -{}", format_money(paid, symbol));
        println!("  Balance Due:       {}", format_money(invoice.balance_due(), symbol));
    }

    if let Some(schedule) = &invoice.payment_schedule {
        println!();
        let rows: Vec<ScheduleRow> = schedule
            .iter()
            .map(|s| ScheduleRow {
                label: s.label.clone(),
                date: display_date(s.date),
                amount: format_money(s.amount, symbol),
            })
            .collect();
        println!("{}", Table::new(rows).with(Style::rounded()));
    }

    println!();
    println!("Status: {}", invoice.status);
}

/// Show the invoice that would be created
fn cmd_preview(cfg_dir: &Path, args: &InvoiceArgs) -> Result<()> {
    let store = open_store(cfg_dir)?;
    let config = load_config(cfg_dir)?;
    let ledger = store.load()?;

    let request = build_request(args, &ledger, config.invoice.default_terms)?;
    let invoice = draft_invoice(&ledger, &request, &config.invoice.prefix, today())?;

    print_invoice(&invoice, &config.invoice.currency_symbol);
    println!("(preview only, nothing saved)");
    Ok(())
}

/// Generate a new invoice
fn cmd_generate(cfg_dir: &Path, args: &InvoiceArgs, pdf: bool, open: bool) -> Result<()> {
    let store = open_store(cfg_dir)?;
    let config = load_config(cfg_dir)?;
    let ledger = store.load()?;

    let request = build_request(args, &ledger, config.invoice.default_terms)?;
    let invoice = save_invoice(&store, &request, &config.invoice.prefix, today())?;
    let symbol = &config.invoice.currency_symbol;

    println!("Generated {}", invoice.invoice_number);
    println!("  Client: {}", invoice.client_id);
    println!("  Items:  {}", invoice.items.len());
    println!("  Total:  {}", format_money(invoice.total, symbol));
    if let Some(schedule) = &invoice.payment_schedule {
        for s in schedule {
            println!(
                "  {}: {} by {}",
                s.label,
                format_money(s.amount, symbol),
                display_date(s.date)
            );
        }
    }
    println!("  Status: {}", invoice.status);

    if pdf {
        let ledger = store.load()?;
        let pdf_path = render_invoice(cfg_dir, &ledger, &invoice)?;
        println!("  Saved:  {}", pdf_path.display());
        if open {
            open_path(&pdf_path)?;
        }
    }

    Ok(())
}

fn render_invoice(cfg_dir: &Path, ledger: &Ledger, invoice: &Invoice) -> Result<PathBuf> {
    let config = load_config(cfg_dir)?;
    let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
    std::fs::create_dir_all(&output_dir)?;

    let pdf_path = output_dir.join(format!("{}.pdf", invoice.invoice_number));
    let document = InvoiceDocument::new(invoice, &config, ledger);
    generate_pdf(&document, &pdf_path)?;
    Ok(pdf_path)
}

/// Render an invoice PDF from stored data
fn cmd_render(cfg_dir: &Path, invoice_ref: &str, open: bool) -> Result<()> {
    let store = open_store(cfg_dir)?;
    let ledger = store.load()?;

    let id = resolve_invoice(&ledger, invoice_ref)?;
    let invoice = find_invoice(&ledger, &id)?;
    let pdf_path = render_invoice(cfg_dir, &ledger, invoice)?;

    println!("Rendered {}", invoice.invoice_number);
    println!("  Saved: {}", pdf_path.display());

    if open {
        open_path(&pdf_path)?;
    }
    Ok(())
}

fn open_path(pdf_path: &Path) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", ""])
            .arg(pdf_path)
            .spawn()?;
    }
    Ok(())
}

/// List saved invoices, newest first
fn cmd_invoices(cfg_dir: &Path, limit: Option<usize>) -> Result<()> {
    let store = open_store(cfg_dir)?;
    let config = load_config(cfg_dir)?;
    let ledger = store.load()?;

    if ledger.invoices.is_empty() {
        println!("No invoices generated yet.");
        return Ok(());
    }

    let invoices: Vec<_> = ledger.invoices.iter().rev().enumerate().collect();
    let invoices = match limit {
        Some(n) => &invoices[..n.min(invoices.len())],
        None => &invoices[..],
    };

    let symbol = &config.invoice.currency_symbol;
    let now = Utc::now();
    let rows: Vec<InvoiceRow> = invoices
        .iter()
        .map(|(idx, invoice)| {
            let overdue = if invoice.status == InvoiceStatus::Paid {
                0
            } else {
                overdue_days(invoice.due_date, now)
            };
            let due = if overdue > 0 {
                format!("{} ({}d overdue)", display_date(invoice.due_date), overdue)
            } else {
                display_date(invoice.due_date)
            };
            InvoiceRow {
                index: idx + 1,
                number: invoice.invoice_number.clone(),
                due,
                total: format_money(invoice.total, symbol),
                status: invoice.status.to_string(),
                client: invoice.client_id.clone(),
            }
        })
        .collect();

    let shown_total: f64 = invoices.iter().map(|(_, i)| i.total).sum();
    let shown_paid: f64 = invoices.iter().map(|(_, i)| i.paid_amount()).sum();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    let table = add_financial_footer(
        &table,
        &format_money(shown_total, symbol),
        &format_money(shown_paid, symbol),
        &format_money(shown_total - shown_paid, symbol),
    );

    println!("{table}");
    println!();
    println!("Total: {} invoices", ledger.invoices.len());
    println!("Use index number with render/add-payment/payments/draft-email (e.g., 'stay-billing payments 1')");

    Ok(())
}

/// Record a payment against an invoice
fn cmd_add_payment(
    cfg_dir: &Path,
    invoice_ref: &str,
    amount: f64,
    date_str: Option<String>,
    method: String,
    note: Option<String>,
) -> Result<()> {
    let store = open_store(cfg_dir)?;
    let config = load_config(cfg_dir)?;
    let mut ledger = store.load()?;

    let id = resolve_invoice(&ledger, invoice_ref)?;
    let date = match date_str {
        Some(s) => parse_date(&s)?,
        None => today(),
    };

    let status = record_payment(
        &mut ledger,
        &id,
        InvoicePayment {
            id: Uuid::new_v4().to_string(),
            date,
            amount,
            method,
            note: note.filter(|n| !n.is_empty()),
        },
    )?;
    store.save(&ledger)?;

    let invoice = find_invoice(&ledger, &id)?;
    let symbol = &config.invoice.currency_symbol;
    if status == InvoiceStatus::Paid {
        println!(
            "Recorded {} payment for {} (fully paid)",
            format_money(amount, symbol),
            invoice.invoice_number
        );
    } else {
        println!(
            "Recorded {} payment for {} ({} remaining)",
            format_money(amount, symbol),
            invoice.invoice_number,
            format_money(invoice.balance_due(), symbol)
        );
    }
    println!("  Status: {}", status);

    Ok(())
}

/// Remove a payment from an invoice
fn cmd_remove_payment(cfg_dir: &Path, invoice_ref: &str, index: Option<usize>) -> Result<()> {
    let store = open_store(cfg_dir)?;
    let config = load_config(cfg_dir)?;
    let mut ledger = store.load()?;

    let id = resolve_invoice(&ledger, invoice_ref)?;
    let removed = remove_payment(&mut ledger, &id, index)?;
    store.save(&ledger)?;

    let invoice = find_invoice(&ledger, &id)?;
    println!(
        "Removed {} payment from {} (status: {})",
        format_money(removed.amount, &config.invoice.currency_symbol),
        invoice.invoice_number,
        invoice.status
    );

    Ok(())
}

/// Show payment history for an invoice
fn cmd_payments(cfg_dir: &Path, invoice_ref: &str) -> Result<()> {
    let store = open_store(cfg_dir)?;
    let config = load_config(cfg_dir)?;
    let ledger = store.load()?;

    let id = resolve_invoice(&ledger, invoice_ref)?;
    let invoice = find_invoice(&ledger, &id)?;
    let symbol = &config.invoice.currency_symbol;

    println!("Payments for {}", invoice.invoice_number);

    if invoice.payments.is_empty() {
        println!("  No payments recorded.");
    } else {
        let rows: Vec<PaymentRow> = invoice
            .payments
            .iter()
            .enumerate()
            .map(|(idx, p)| PaymentRow {
                index: idx + 1,
                date: display_date(p.date),
                amount: format_money(p.amount, symbol),
                method: p.method.clone(),
                note: p.note.clone().unwrap_or_default(),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }

    println!(
        "Total paid: {} / {} (Status: {})",
        format_money(invoice.paid_amount(), symbol),
        format_money(invoice.total, symbol),
        invoice.status
    );

    Ok(())
}

/// Draft a cover email; failures leave nothing behind
fn cmd_draft_email(cfg_dir: &Path, invoice_ref: &str) -> Result<()> {
    let store = open_store(cfg_dir)?;
    let config = load_config(cfg_dir)?;
    let ledger = store.load()?;

    let id = resolve_invoice(&ledger, invoice_ref)?;
    let invoice = find_invoice(&ledger, &id)?;

    let Some(settings) = &config.email else {
        println!("Email drafting is not configured. Add an [email] section to config.toml.");
        return Ok(());
    };

    let project_names: Vec<String> = ledger
        .projects
        .iter()
        .filter(|p| p.client == invoice.client_id)
        .map(|p| p.name.clone())
        .collect();
    let total = format!("{}{:.2}", config.invoice.currency_symbol, invoice.total);

    let draft = match HttpDrafter::from_settings(settings) {
        Ok(drafter) => draft_or_none(&drafter, &invoice.client_id, &total, &project_names),
        Err(e) => {
            tracing::warn!(error = %e, "email drafter unavailable");
            None
        }
    };

    match draft {
        Some(text) => println!("{text}"),
        None => println!("No draft generated."),
    }
    Ok(())
}

/// Show ledger status
fn cmd_status(cfg_dir: &Path, client: Option<&str>) -> Result<()> {
    let store = open_store(cfg_dir)?;
    let config = load_config(cfg_dir)?;
    let ledger = store.load()?;
    let symbol = &config.invoice.currency_symbol;

    let next_number = invoice_number(&config.invoice.prefix, client, today(), &ledger.invoices);
    let outstanding: f64 = ledger
        .invoices
        .iter()
        .filter(|i| i.status != InvoiceStatus::Paid)
        .map(|i| i.balance_due())
        .sum();

    println!("Billing Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Company:          {}", config.company.name);
    println!("Projects:         {}", ledger.projects.len());
    println!("Logs:             {}", ledger.logs.len());
    println!("Invoices:         {}", ledger.invoices.len());
    println!("Outstanding:      {}", format_money(outstanding, symbol));
    println!("Next invoice:     {}", next_number);

    if !ledger.invoices.is_empty() {
        println!();
        println!("Recent invoices:");
        for invoice in ledger.invoices.iter().rev().take(5) {
            println!(
                "  {} - {} - {} - {}",
                invoice.invoice_number,
                invoice.client_id,
                format_money(invoice.total, symbol),
                invoice.status
            );
        }
    }

    Ok(())
}
