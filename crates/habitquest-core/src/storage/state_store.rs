//! Persistence for the engine snapshot.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::engine::EngineState;
use crate::error::{Result, StorageError};

/// Loads and saves whole snapshots.
pub trait StateStore {
    /// `Ok(None)` means nothing has been saved yet.
    fn load(&self) -> Result<Option<EngineState>>;

    /// Replace the stored snapshot. A failed save must leave the previous
    /// snapshot intact.
    fn save(&mut self, state: &EngineState) -> Result<()>;
}

/// Pretty-printed JSON file, replaced through a temp file and a rename.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<EngineState>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::ReadFailed {
                    path: self.path.clone(),
                    source,
                }
                .into())
            }
        };
        let state = serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        Ok(Some(state))
    }

    fn save(&mut self, state: &EngineState) -> Result<()> {
        let content = serde_json::to_string_pretty(state)?;
        let write_failed = |source: std::io::Error| StorageError::WriteFailed {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_failed)?;
        }
        let tmp = self.temp_path();
        std::fs::write(&tmp, content).map_err(write_failed)?;
        std::fs::rename(&tmp, &self.path).map_err(write_failed)?;
        tracing::info!(path = %self.path.display(), "state saved");
        Ok(())
    }
}

/// In-memory store. Clones share the same slot, so a test can keep a
/// handle and inspect what the engine saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<EngineState>>>,
    saves: Rc<RefCell<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last saved snapshot.
    pub fn snapshot(&self) -> Option<EngineState> {
        self.slot.borrow().clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<EngineState>> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&mut self, state: &EngineState) -> Result<()> {
        *self.slot.borrow_mut() = Some(state.clone());
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}
