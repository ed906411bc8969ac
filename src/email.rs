//! Invoice email drafts from a text-generation service.
//!
//! Drafting is best effort: [`draft_or_none`] swallows every failure so a
//! broken service never touches invoice state.

use std::time::Duration;

use tracing::warn;
use ureq::Agent;

use crate::config::EmailSettings;
use crate::error::{InvoiceError, Result};

pub trait EmailDrafter {
    fn draft_invoice_email(
        &self,
        client: &str,
        total: &str,
        project_names: &[String],
    ) -> Result<String>;
}

/// Prompt sent to the text-generation service
pub fn email_prompt(client: &str, total: &str, project_names: &[String]) -> String {
    format!(
        "Write a short, friendly and professional email to {client} sending their invoice \
         for {total}. The invoice covers: {}. Mention that payment details are on the \
         invoice and thank them for their business. Return only the email body.",
        if project_names.is_empty() {
            "recent services".to_string()
        } else {
            project_names.join(", ")
        }
    )
}

/// Drafter backed by a `generateContent`-style HTTP endpoint
pub struct HttpDrafter {
    settings: EmailSettings,
    api_key: String,
    agent: Agent,
}

impl HttpDrafter {
    /// Reads the API key from the environment variable named in the settings
    pub fn from_settings(settings: &EmailSettings) -> Result<Self> {
        let api_key = std::env::var(&settings.api_key_env).map_err(|_| {
            InvoiceError::EmailDraft(format!("{} is not set", settings.api_key_env))
        })?;

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(20)))
            .build()
            .into();

        Ok(Self {
            settings: settings.clone(),
            api_key,
            agent,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.model,
            self.api_key
        )
    }
}

impl EmailDrafter for HttpDrafter {
    fn draft_invoice_email(
        &self,
        client: &str,
        total: &str,
        project_names: &[String],
    ) -> Result<String> {
        let body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": email_prompt(client, total, project_names) }]
            }]
        });

        let response: String = self
            .agent
            .post(&self.url())
            .header("Content-Type", "application/json")
            .send(body.to_string())
            .map_err(|e| InvoiceError::EmailDraft(e.to_string()))?
            .body_mut()
            .read_to_string()
            .map_err(|e| InvoiceError::EmailDraft(e.to_string()))?;

        parse_draft(&response)
    }
}

/// Pull the generated text out of a `generateContent` response
pub fn parse_draft(response: &str) -> Result<String> {
    let json: serde_json::Value =
        serde_json::from_str(response).map_err(|e| InvoiceError::EmailDraft(e.to_string()))?;

    json["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| InvoiceError::EmailDraft("response carried no text".to_string()))
}

/// Draft an email, or log the failure and return `None`
pub fn draft_or_none<D: EmailDrafter + ?Sized>(
    drafter: &D,
    client: &str,
    total: &str,
    project_names: &[String],
) -> Option<String> {
    match drafter.draft_invoice_email(client, total, project_names) {
        Ok(draft) => Some(draft),
        Err(e) => {
            warn!(client = %client, error = %e, "email draft failed");
            None
        }
    }
}
