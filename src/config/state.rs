use serde::{Deserialize, Serialize};
use tracing::debug;

use super::invoice::{Invoice, InvoicePatch};
use super::log::{LogEntry, LogPatch};
use super::project::{Project, ProjectStatus};
use crate::error::{InvoiceError, Result};

/// Everything the application tracks: projects, logs and invoices.
///
/// Callers assign ids before handing records over. Mutations go through
/// the methods below so that invoices only change via [`Ledger::update_invoice`].
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct Ledger {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
}

impl Ledger {
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn log(&self, id: &str) -> Option<&LogEntry> {
        self.logs.iter().find(|l| l.id == id)
    }

    pub fn invoice(&self, id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.id == id)
    }

    pub fn invoice_by_number(&self, number: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.invoice_number == number)
    }

    pub fn add_project(&mut self, project: Project) -> String {
        let id = project.id.clone();
        debug!(project = %id, name = %project.name, "adding project");
        self.projects.push(project);
        id
    }

    pub fn update_project_status(&mut self, id: &str, status: ProjectStatus) -> Result<()> {
        let project = self
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| InvoiceError::ProjectNotFound(id.to_string()))?;
        project.status = status;
        Ok(())
    }

    pub fn add_log(&mut self, log: LogEntry) -> String {
        let id = log.id.clone();
        debug!(log = %id, kind = %log.kind.log_type(), "adding log");
        self.logs.push(log);
        id
    }

    pub fn update_log(&mut self, id: &str, patch: LogPatch) -> Result<()> {
        if let Some(project_id) = &patch.project_id {
            if self.project(project_id).is_none() {
                return Err(InvoiceError::ProjectNotFound(project_id.clone()));
            }
        }
        let log = self
            .logs
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| InvoiceError::LogNotFound(id.to_string()))?;
        log.apply(patch)
    }

    pub fn delete_log(&mut self, id: &str) -> Result<LogEntry> {
        let idx = self
            .logs
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| InvoiceError::LogNotFound(id.to_string()))?;
        Ok(self.logs.remove(idx))
    }

    pub fn add_invoice(&mut self, invoice: Invoice) -> String {
        let id = invoice.id.clone();
        debug!(invoice = %id, number = %invoice.invoice_number, "adding invoice");
        self.invoices.push(invoice);
        id
    }

    pub fn update_invoice(&mut self, id: &str, patch: InvoicePatch) -> Result<()> {
        let invoice = self
            .invoices
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| InvoiceError::InvoiceNotFound(id.to_string()))?;
        if let Some(payments) = patch.payments {
            invoice.payments = payments;
        }
        if let Some(status) = patch.status {
            invoice.status = status;
        }
        Ok(())
    }
}
