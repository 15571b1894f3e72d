//! Key-value persistence substrate for cached payloads.
//!
//! This module defines the `SlotStore` trait that abstracts over where slot
//! data lives (files on disk, memory). Slot ids are short filesystem-safe
//! names derived from [`LocationKey::slug`](crate::location::LocationKey::slug)
//! or fixed identifiers such as the latest-lookup slot.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Durable slot-addressed byte storage.
pub trait SlotStore: Send + Sync {
    /// Read the bytes stored in `slot`, or `None` if the slot is absent.
    ///
    /// # Errors
    /// Returns an error for infrastructure failures (IO, permissions); a
    /// missing slot is not an error.
    fn read(&self, slot: &str) -> Result<Option<Vec<u8>>>;

    /// Write `bytes` to `slot`, replacing any previous contents whole.
    ///
    /// # Errors
    /// Returns an error if the write could not be completed.
    fn write(&self, slot: &str, bytes: &[u8]) -> Result<()>;

    /// Remove `slot`. Removing an absent slot is a no-op.
    ///
    /// # Errors
    /// Returns an error for infrastructure failures.
    fn delete(&self, slot: &str) -> Result<()>;

    /// Whether `slot` currently holds data.
    fn exists(&self, slot: &str) -> bool;
}

impl<S: SlotStore + ?Sized> SlotStore for Arc<S> {
    fn read(&self, slot: &str) -> Result<Option<Vec<u8>>> {
        (**self).read(slot)
    }

    fn write(&self, slot: &str, bytes: &[u8]) -> Result<()> {
        (**self).write(slot, bytes)
    }

    fn delete(&self, slot: &str) -> Result<()> {
        (**self).delete(slot)
    }

    fn exists(&self, slot: &str) -> bool {
        (**self).exists(slot)
    }
}

/// File-backed store: one `<slot>.json` file per slot under a root directory.
///
/// The directory is created lazily on first write.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, slot: &str) -> PathBuf {
        self.root.join(format!("{}.json", slot))
    }
}

impl SlotStore for DirStore {
    fn read(&self, slot: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(slot);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read slot file {}", path.display()))
            }
        }
    }

    fn write(&self, slot: &str, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create store directory {}", self.root.display()))?;
        let path = self.path_for(slot);
        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write slot file {}", path.display()))
    }

    fn delete(&self, slot: &str) -> Result<()> {
        let path = self.path_for(slot);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to delete slot file {}", path.display()))
            }
        }
    }

    fn exists(&self, slot: &str) -> bool {
        self.path_for(slot).is_file()
    }
}

/// In-memory store for tests and ephemeral callers.
#[derive(Debug, Default)]
pub struct MemStore {
    slots: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemStore {
    fn read(&self, slot: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.slots.lock().get(slot).cloned())
    }

    fn write(&self, slot: &str, bytes: &[u8]) -> Result<()> {
        self.slots.lock().insert(slot.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete(&self, slot: &str) -> Result<()> {
        self.slots.lock().remove(slot);
        Ok(())
    }

    fn exists(&self, slot: &str) -> bool {
        self.slots.lock().contains_key(slot)
    }
}
