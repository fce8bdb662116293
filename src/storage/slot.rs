//! Storage slots: one named blob per entity collection
//!
//! A slot holds the JSON serialization of a whole collection; reads and
//! writes are whole-slot operations. The file-backed store writes to a
//! temporary file and renames it into place, so a reader never observes a
//! half-written blob.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::errors::{StorageError, StorageResult};

/// Whole-slot read/write access.
pub trait SlotStore {
    /// Reads the payload of a slot. `None` means the slot was never written.
    fn read_slot(&self, slot: &str) -> StorageResult<Option<String>>;

    /// Replaces the payload of a slot in one operation.
    fn write_slot(&self, slot: &str, payload: &str) -> StorageResult<()>;
}

/// File-backed store: one `<slot>.json` file per slot under a data
/// directory.
pub struct FileSlotStore {
    root: PathBuf,
}

impl FileSlotStore {
    /// Opens the store rooted at `root`, creating the directory if missing.
    pub fn open(root: &Path) -> StorageResult<Self> {
        fs::create_dir_all(root).map_err(|e| StorageError::OpenFailed {
            path: root.to_path_buf(),
            source: e,
        })?;
        Ok(FileSlotStore {
            root: root.to_path_buf(),
        })
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.root.join(format!("{slot}.json"))
    }
}

impl SlotStore for FileSlotStore {
    fn read_slot(&self, slot: &str) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.slot_path(slot)) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                slot: slot.to_string(),
                source: e,
            }),
        }
    }

    fn write_slot(&self, slot: &str, payload: &str) -> StorageResult<()> {
        let tmp = self.root.join(format!("{slot}.json.tmp"));
        fs::write(&tmp, payload).map_err(|e| StorageError::WriteFailed {
            slot: slot.to_string(),
            source: e,
        })?;
        fs::rename(&tmp, self.slot_path(slot)).map_err(|e| StorageError::WriteFailed {
            slot: slot.to_string(),
            source: e,
        })
    }
}

/// In-memory store for tests and embedders with their own persistence.
#[derive(Default)]
pub struct MemorySlotStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemorySlotStore {
    fn read_slot(&self, slot: &str) -> StorageResult<Option<String>> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Ok(slots.get(slot).cloned())
    }

    fn write_slot(&self, slot: &str, payload: &str) -> StorageResult<()> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.insert(slot.to_string(), payload.to_string());
        Ok(())
    }
}
