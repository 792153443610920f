//! Persistent backends for the record store.
//!
//! The merge engine only ever sees a [`RecordStore`]; where it is read from
//! and written to is decided by a [`StoreBackend`].

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::store::codec::{decode, encode, LoadedStore};
use crate::store::records::RecordStore;
use crate::Result;

/// Load/save capability for the record store.
pub trait StoreBackend {
    /// Read the persisted state.
    fn load(&self) -> Result<LoadedStore>;

    /// Replace the persisted state with `store`, stamped with `written_on`.
    fn save(&self, store: &RecordStore, written_on: NaiveDate) -> Result<()>;
}

/// Flat file backend.
///
/// Saving writes the whole snapshot to a sibling temporary file and renames
/// it over the store, so the previous contents are fully replaced.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Path of the store file.
    path: PathBuf,
}

impl FileStore {
    /// Create a backend for the given path. The file does not need to exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the store file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the temporary file used while saving.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StoreBackend for FileStore {
    fn load(&self) -> Result<LoadedStore> {
        match fs::read_to_string(&self.path) {
            Ok(content) => decode(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(
                    "Store file {} does not exist yet, starting empty",
                    self.path.display()
                );
                Ok(LoadedStore::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, store: &RecordStore, written_on: NaiveDate) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp = self.temp_path();
        fs::write(&temp, encode(store, written_on))?;
        fs::rename(&temp, &self.path)?;

        debug!(
            "Saved {} record(s) to {}",
            store.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// In-memory backend holding the encoded text.
#[derive(Debug, Default)]
pub struct MemoryStore {
    content: RefCell<Option<String>>,
}

impl MemoryStore {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-filled with encoded store text.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: RefCell::new(Some(content.into())),
        }
    }

    /// The last saved text, if anything was saved or pre-filled.
    pub fn content(&self) -> Option<String> {
        self.content.borrow().clone()
    }
}

impl StoreBackend for MemoryStore {
    fn load(&self) -> Result<LoadedStore> {
        match self.content.borrow().as_deref() {
            Some(content) => decode(content),
            None => Ok(LoadedStore::default()),
        }
    }

    fn save(&self, store: &RecordStore, written_on: NaiveDate) -> Result<()> {
        *self.content.borrow_mut() = Some(encode(store, written_on));
        Ok(())
    }
}
