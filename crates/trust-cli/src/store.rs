//! JSON file-backed [`StateStore`].
//!
//! The whole document is held in memory and rewritten on every save. Writes
//! go to a temporary file in the target directory which is then renamed over
//! the original, so readers never observe a half-written document.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tempfile::NamedTempFile;
use trust_core::obs;
use trust_core::{ContributorState, Result, StateDocument, StateStore, TrustError};

pub struct JsonFileStore {
    path: PathBuf,
    document: Mutex<StateDocument>,
}

impl JsonFileStore {
    /// Open `path`. A missing file is an empty store; it is created on the
    /// first save.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = if path.exists() {
            let text = std::fs::read_to_string(&path).map_err(|e| {
                TrustError::StorageError(format!("failed to read {}: {e}", path.display()))
            })?;
            if text.trim().is_empty() {
                StateDocument::default()
            } else {
                StateDocument::from_json_str(&text)?
            }
        } else {
            StateDocument::default()
        };
        obs::emit_state_loaded(document.contributors.len());

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> Result<MutexGuard<'_, StateDocument>> {
        self.document
            .lock()
            .map_err(|_| TrustError::StorageError("state file lock poisoned".to_string()))
    }

    fn write_atomically(&self, document: &StateDocument) -> Result<()> {
        let json = document.to_json_pretty()?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let storage = |e: std::io::Error| {
            TrustError::StorageError(format!("failed to write {}: {e}", self.path.display()))
        };

        let mut tmp = NamedTempFile::new_in(&dir).map_err(storage)?;
        tmp.write_all(json.as_bytes()).map_err(storage)?;
        tmp.write_all(b"\n").map_err(storage)?;
        tmp.as_file().sync_all().map_err(storage)?;
        tmp.persist(&self.path).map_err(|e| storage(e.error))?;
        Ok(())
    }
}

impl StateStore for JsonFileStore {
    fn load(&self, contributor: &str) -> Result<Option<ContributorState>> {
        Ok(self.guard()?.contributors.get(contributor).cloned())
    }

    fn contributor_ids(&self) -> Result<Vec<String>> {
        Ok(self.guard()?.contributors.keys().cloned().collect())
    }

    fn save(&self, state: &ContributorState) -> Result<()> {
        let mut document = self.guard()?;
        let mut updated = document.clone();
        updated
            .contributors
            .insert(state.contributor.clone(), state.clone());
        self.write_atomically(&updated)?;
        *document = updated;
        Ok(())
    }
}
