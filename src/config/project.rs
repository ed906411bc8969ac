use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InvoiceError;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    #[default]
    Active,
    Archived,
    Completed,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::Active => write!(f, "ACTIVE"),
            ProjectStatus::Archived => write!(f, "ARCHIVED"),
            ProjectStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = InvoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(ProjectStatus::Active),
            "archived" => Ok(ProjectStatus::Archived),
            "completed" => Ok(ProjectStatus::Completed),
            _ => Err(InvoiceError::InvalidValue {
                field: "status".to_string(),
                value: s.to_string(),
                reason: "use 'active', 'archived' or 'completed'".to_string(),
            }),
        }
    }
}

/// A property or engagement that logs are booked against
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Client billed for this project unless a log overrides it
    pub client: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub hourly_rate: f64,
    #[serde(default)]
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
}
