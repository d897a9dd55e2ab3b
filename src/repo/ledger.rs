use crate::error::{Result, TriggerError};
use crate::models::{Module, ModuleStatus};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Module name -> completion record
pub type LedgerEntries = BTreeMap<String, ModuleStatus>;

/// Per-configuration completion ledger
///
/// Stored as `.<config-hash>.json` next to the generated input JSON. The file
/// is created on the first update and is the only record of which modules
/// have finished for that configuration.
#[derive(Debug, Clone)]
pub struct StatusLedger {
    path: PathBuf,
}

impl StatusLedger {
    /// Ledger for `hash` inside `json_dir`
    pub fn open(json_dir: &Path, hash: &Uuid) -> Self {
        Self {
            path: json_dir.join(format!(".{}.json", hash)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Every module, unset
    pub fn unset_entries() -> LedgerEntries {
        Module::ALL
            .iter()
            .map(|m| (m.as_str().to_string(), ModuleStatus::default()))
            .collect()
    }

    fn read_file(&self) -> Result<LedgerEntries> {
        let content = fs::read_to_string(&self.path).map_err(|e| TriggerError::io(&self.path, e))?;
        serde_json::from_str(&content).map_err(|e| TriggerError::json(&self.path, e))
    }

    /// Full ledger; modules missing from the file (or a missing file) read as unset
    pub fn load(&self) -> Result<LedgerEntries> {
        let mut entries = Self::unset_entries();
        if self.exists() {
            entries.extend(self.read_file()?);
        }
        Ok(entries)
    }

    /// Status of one module
    pub fn get(&self, module: Module) -> Result<ModuleStatus> {
        if !self.exists() {
            return Ok(ModuleStatus::default());
        }
        Ok(self.read_file()?.remove(module.as_str()).unwrap_or_default())
    }

    /// Merge `updates` into the ledger and write it back
    ///
    /// Without an existing file every module starts unset. An empty update
    /// just materializes the file.
    pub fn update(&self, updates: &[(Module, ModuleStatus)]) -> Result<LedgerEntries> {
        let mut entries = if self.exists() {
            self.read_file()?
        } else {
            Self::unset_entries()
        };

        for (module, status) in updates {
            entries.insert(module.as_str().to_string(), status.clone());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| TriggerError::io(parent, e))?;
        }
        let content = serde_json::to_string(&entries).map_err(|e| TriggerError::json(&self.path, e))?;
        fs::write(&self.path, content).map_err(|e| TriggerError::io(&self.path, e))?;

        log::debug!("Updated status ledger {}", self.path.display());
        Ok(entries)
    }
}
