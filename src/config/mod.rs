mod company;
mod invoice;
mod log;
mod project;
mod state;
mod store;

pub use company::{Bank, Company, Config, EmailSettings, InvoiceSettings, PdfSettings};
pub use invoice::{
    Invoice, InvoiceItem, InvoicePatch, InvoicePayment, InvoiceSchedule, InvoiceStatus,
    PaymentTerms,
};
pub use log::{LogEntry, LogKind, LogPatch, LogType, StayPricing};
pub use project::{Project, ProjectStatus};
pub use state::Ledger;
pub use store::{FileStore, MemoryStore, Store};

use crate::error::{InvoiceError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.stay-billing/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "stay-billing") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.stay-billing/
    let home = dirs_home().ok_or_else(|| {
        InvoiceError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".stay-billing"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the PDF output directory; relative paths hang off the config dir
pub fn resolve_output_dir(output_dir: &str, config_dir: &Path) -> PathBuf {
    let expanded = expand_path(output_dir);
    if expanded.is_absolute() {
        expanded
    } else {
        config_dir.join(expanded)
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(InvoiceError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| InvoiceError::ConfigParse { path, source: e })
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[company]
name = "Your Company, LLC"
address = ["123 Business Street", "Palm Springs, CA 92264"]
email = "billing@yourcompany.com"
# phone = "+1 (555) 123-4567"    # optional

[company.bank]
name = "Your Bank"
address = "1 Market Street, San Francisco, CA 94105"
routing = "000000000"
account = "0000000000"
beneficiary = "Your Company, LLC"

[invoice]
prefix = "INV"                   # e.g., INV-SMI-2405-01
currency_symbol = "$"
default_terms = "DUE_ON_RECEIPT" # DUE_ON_RECEIPT, NET_15, NET_30 or CUSTOM

[pdf]
output_dir = "output"            # relative to this directory, or absolute / ~/...

# Optional: AI email drafts through a generateContent-style endpoint
# [email]
# endpoint = "https://generativelanguage.googleapis.com/v1beta/models"
# model = "gemini-1.5-flash"
# api_key_env = "GEMINI_API_KEY"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.invoice.prefix, "INV");
        assert_eq!(config.invoice.default_terms, PaymentTerms::DueOnReceipt);
        assert_eq!(config.company.address.len(), 2);
        assert!(config.email.is_none());
    }

    #[test]
    fn relative_output_dir_resolves_against_config_dir() {
        let dir = Path::new("/tmp/billing");
        assert_eq!(
            resolve_output_dir("output", dir),
            PathBuf::from("/tmp/billing/output")
        );
        assert_eq!(
            resolve_output_dir("/var/pdfs", dir),
            PathBuf::from("/var/pdfs")
        );
    }
}
