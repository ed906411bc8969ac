use serde::{Deserialize, Serialize};

use super::invoice::PaymentTerms;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub company: Company,
    pub invoice: InvoiceSettings,
    pub pdf: PdfSettings,
    #[serde(default)]
    pub email: Option<EmailSettings>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Company {
    pub name: String,
    pub address: Vec<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub bank: Bank,
}

/// Remittance details printed in the invoice footer
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Bank {
    pub name: String,
    pub address: String,
    pub routing: String,
    pub account: String,
    pub beneficiary: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InvoiceSettings {
    /// Organization code every invoice number starts with
    pub prefix: String,
    pub currency_symbol: String,
    #[serde(default)]
    pub default_terms: PaymentTerms,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PdfSettings {
    pub output_dir: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmailSettings {
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
