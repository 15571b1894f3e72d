//! User-pinned locations.
//!
//! Membership in the favorite set decides which cache slot a lookup uses, so
//! adds and removes go through [`LocationKey`] equality (normalized form).

use anyhow::Result;

use crate::location::LocationKey;
use crate::storage::SlotStore;

/// Fixed id of the slot holding the favorites list.
const FAVORITES_SLOT: &str = "favorites";

/// Persisted set of favorite locations, stored as a JSON array of keys.
pub struct FavoriteSet {
    store: Box<dyn SlotStore>,
}

impl FavoriteSet {
    pub fn new(store: Box<dyn SlotStore>) -> Self {
        Self { store }
    }

    /// All favorites, in the order they were added.
    pub fn list(&self) -> Vec<LocationKey> {
        self.load()
    }

    pub fn is_favorite(&self, key: &LocationKey) -> bool {
        self.load().iter().any(|k| k == key)
    }

    /// Pin `key`. Adding an existing favorite is a no-op.
    ///
    /// # Errors
    /// Returns an error if the updated set could not be persisted.
    pub fn add(&self, key: &LocationKey) -> Result<()> {
        let mut all = self.load();
        if all.iter().any(|k| k == key) {
            return Ok(());
        }
        all.push(key.clone());
        self.save(&all)
    }

    /// Unpin `key`, returning whether it was present.
    ///
    /// # Errors
    /// Returns an error if the updated set could not be persisted.
    pub fn remove(&self, key: &LocationKey) -> Result<bool> {
        let mut all = self.load();
        let before = all.len();
        all.retain(|k| k != key);
        if all.len() == before {
            return Ok(false);
        }
        self.save(&all)?;
        Ok(true)
    }

    fn load(&self) -> Vec<LocationKey> {
        let bytes = match self.store.read(FAVORITES_SLOT) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read favorites: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!("Resetting corrupt favorites list: {}", e);
                if let Err(e) = self.store.delete(FAVORITES_SLOT) {
                    tracing::warn!("Failed to delete corrupt favorites list: {}", e);
                }
                Vec::new()
            }
        }
    }

    fn save(&self, keys: &[LocationKey]) -> Result<()> {
        let bytes = serde_json::to_vec(keys)?;
        self.store.write(FAVORITES_SLOT, &bytes)
    }
}
