use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use super::state::Ledger;
use crate::error::{InvoiceError, Result};

/// Persistence boundary for the ledger
pub trait Store {
    fn load(&self) -> Result<Ledger>;
    fn save(&self, ledger: &Ledger) -> Result<()>;
}

/// Ledger kept in `state.toml` inside the config directory
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join("state.toml"),
        }
    }
}

impl Store for FileStore {
    /// A missing file is an empty ledger
    fn load(&self) -> Result<Ledger> {
        if !self.path.exists() {
            return Ok(Ledger::default());
        }
        let content = fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| InvoiceError::StateParse {
            path: self.path.clone(),
            source: e,
        })
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let content = toml::to_string_pretty(ledger)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// In-process store, used by tests
#[derive(Default)]
pub struct MemoryStore {
    ledger: RefCell<Ledger>,
}

impl MemoryStore {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: RefCell::new(ledger),
        }
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Ledger> {
        Ok(self.ledger.borrow().clone())
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        *self.ledger.borrow_mut() = ledger.clone();
        Ok(())
    }
}
