//! Timestamped forecast cache over a [`SlotStore`].
//!
//! Entries are JSON envelopes of the form
//! `{"timestamp": <epoch millis>, "data": <forecast>}`. Reads are
//! self-healing: a slot that fails to parse is deleted and treated as absent,
//! so corruption never surfaces to callers.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::location::LocationKey;
use crate::storage::SlotStore;
use crate::types::Forecast;

/// Fixed id of the slot holding the most recent non-favorite lookup.
const LATEST_LOOKUP_SLOT: &str = "latest_lookup";

/// Addressable cache slots: one per location, plus the latest-lookup slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Keyed entry for a pinned location.
    Location(LocationKey),
    /// The single unkeyed entry holding the most recent ad-hoc lookup.
    LatestLookup,
}

impl Slot {
    /// Storage id for this slot.
    pub fn id(&self) -> String {
        match self {
            Slot::Location(key) => key.slug(),
            Slot::LatestLookup => LATEST_LOOKUP_SLOT.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedForecast {
    timestamp: i64,
    data: Forecast,
}

/// Persistent forecast cache.
pub struct ForecastCache {
    store: Box<dyn SlotStore>,
}

impl ForecastCache {
    pub fn new(store: Box<dyn SlotStore>) -> Self {
        Self { store }
    }

    /// Read the forecast stored in `slot`.
    ///
    /// Unreadable or unparsable entries are reported as absent; unparsable
    /// ones are deleted.
    pub fn get(&self, slot: &Slot) -> Option<Forecast> {
        self.load(slot).map(|entry| entry.data)
    }

    /// Store `forecast` in `slot`, stamped with the current time.
    ///
    /// Replaces the whole entry; there are no partial updates.
    ///
    /// # Errors
    /// Returns an error if the entry could not be persisted.
    pub fn put(&self, slot: &Slot, forecast: &Forecast) -> Result<()> {
        let entry = CachedForecast {
            timestamp: Utc::now().timestamp_millis(),
            data: forecast.clone(),
        };
        let bytes = serde_json::to_vec(&entry)?;
        self.store.write(&slot.id(), &bytes)
    }

    /// Whether `slot` holds an entry no older than `max_age`.
    ///
    /// Absent and corrupt entries are never valid.
    pub fn is_valid(&self, slot: &Slot, max_age: Duration) -> bool {
        match self.load(slot) {
            Some(entry) => {
                let age_ms = Utc::now().timestamp_millis() - entry.timestamp;
                age_ms <= max_age.as_millis() as i64
            }
            None => false,
        }
    }

    /// When `slot` was last written.
    pub fn last_updated(&self, slot: &Slot) -> Option<DateTime<Utc>> {
        self.load(slot)
            .and_then(|entry| DateTime::from_timestamp_millis(entry.timestamp))
    }

    /// Remove `slot`. Removing an absent slot is a no-op.
    ///
    /// # Errors
    /// Returns an error for storage failures.
    pub fn delete(&self, slot: &Slot) -> Result<()> {
        self.store.delete(&slot.id())
    }

    /// Whether `slot` currently holds data, readable or not.
    pub fn exists(&self, slot: &Slot) -> bool {
        self.store.exists(&slot.id())
    }

    fn load(&self, slot: &Slot) -> Option<CachedForecast> {
        let id = slot.id();
        let bytes = match self.store.read(&id) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read cache slot {}: {}", id, e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Dropping corrupt cache slot {}: {}", id, e);
                if let Err(e) = self.store.delete(&id) {
                    tracing::warn!("Failed to delete corrupt cache slot {}: {}", id, e);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::storage::MemStore;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn test_forecast(city: &str) -> Forecast {
        Forecast {
            location_name: city.to_string(),
            location_country: "PL".to_string(),
            days: vec![crate::types::DayForecast {
                date: NaiveDate::from_ymd_opt(2026, 8, 5).unwrap(),
                avg_temp_c: 21.0,
                avg_humidity_pct: 60.0,
                uv_index: 4.0,
                condition: "Sunny".to_string(),
                icon_url: "//cdn.weatherapi.com/sunny.png".to_string(),
            }],
        }
    }

    fn cache_over(store: &Arc<MemStore>) -> ForecastCache {
        ForecastCache::new(Box::new(Arc::clone(store)))
    }

    #[test]
    fn test_put_then_get() {
        let store = Arc::new(MemStore::new());
        let cache = cache_over(&store);
        let slot = Slot::Location(LocationKey::new("Lodz", "PL"));
        let forecast = test_forecast("Lodz");

        cache.put(&slot, &forecast).unwrap();
        assert_eq!(cache.get(&slot).unwrap(), forecast);
    }

    #[test]
    fn test_fresh_entry_is_valid() {
        let store = Arc::new(MemStore::new());
        let cache = cache_over(&store);
        let slot = Slot::Location(LocationKey::new("Lodz", "PL"));

        cache.put(&slot, &test_forecast("Lodz")).unwrap();
        assert!(cache.is_valid(&slot, Duration::from_secs(60)));
    }

    #[test]
    fn test_stale_entry_is_invalid() {
        let store = Arc::new(MemStore::new());
        let cache = cache_over(&store);
        let slot = Slot::Location(LocationKey::new("Lodz", "PL"));

        // Entry written 70 seconds ago against a 60 second window
        let entry = CachedForecast {
            timestamp: Utc::now().timestamp_millis() - 70_000,
            data: test_forecast("Lodz"),
        };
        store
            .write(&slot.id(), &serde_json::to_vec(&entry).unwrap())
            .unwrap();

        assert!(cache.is_valid(&slot, Duration::from_secs(120)));
        assert!(!cache.is_valid(&slot, Duration::from_secs(60)));
    }

    #[test]
    fn test_absent_entry_is_invalid() {
        let store = Arc::new(MemStore::new());
        let cache = cache_over(&store);
        let slot = Slot::Location(LocationKey::new("Nowhere", "XX"));

        assert!(!cache.is_valid(&slot, Duration::from_secs(60)));
        assert!(cache.get(&slot).is_none());
    }

    #[test]
    fn test_corrupt_entry_heals_to_absent() {
        let store = Arc::new(MemStore::new());
        let cache = cache_over(&store);
        let slot = Slot::Location(LocationKey::new("Lodz", "PL"));

        store.write(&slot.id(), b"{ not json").unwrap();

        assert!(cache.get(&slot).is_none());
        // The corrupt slot was deleted, not just skipped
        assert!(!cache.exists(&slot));
    }

    #[test]
    fn test_corrupt_entry_is_invalid_and_deleted() {
        let store = Arc::new(MemStore::new());
        let cache = cache_over(&store);
        let slot = Slot::LatestLookup;

        store.write(&slot.id(), b"garbage").unwrap();

        assert!(!cache.is_valid(&slot, Duration::from_secs(3600)));
        assert!(!store.exists(&slot.id()));
    }

    #[test]
    fn test_put_overwrites_previous_entry() {
        let store = Arc::new(MemStore::new());
        let cache = cache_over(&store);
        let slot = Slot::LatestLookup;

        cache.put(&slot, &test_forecast("Lodz")).unwrap();
        cache.put(&slot, &test_forecast("Gdansk")).unwrap();

        assert_eq!(cache.get(&slot).unwrap().location_name, "Gdansk");
    }

    #[test]
    fn test_location_and_latest_slots_are_disjoint() {
        let store = Arc::new(MemStore::new());
        let cache = cache_over(&store);
        let keyed = Slot::Location(LocationKey::new("Lodz", "PL"));

        cache.put(&keyed, &test_forecast("Lodz")).unwrap();
        assert!(cache.get(&Slot::LatestLookup).is_none());

        cache.put(&Slot::LatestLookup, &test_forecast("Gdansk")).unwrap();
        assert_eq!(cache.get(&keyed).unwrap().location_name, "Lodz");
    }

    #[test]
    fn test_last_updated_reflects_put_time() {
        let store = Arc::new(MemStore::new());
        let cache = cache_over(&store);
        let slot = Slot::Location(LocationKey::new("Lodz", "PL"));

        assert!(cache.last_updated(&slot).is_none());

        let before = Utc::now();
        cache.put(&slot, &test_forecast("Lodz")).unwrap();
        let updated = cache.last_updated(&slot).unwrap();

        assert!(updated >= before - chrono::Duration::seconds(1));
        assert!(updated <= Utc::now() + chrono::Duration::seconds(1));
    }

    #[test]
    fn test_delete_removes_entry() {
        let store = Arc::new(MemStore::new());
        let cache = cache_over(&store);
        let slot = Slot::Location(LocationKey::new("Lodz", "PL"));

        cache.put(&slot, &test_forecast("Lodz")).unwrap();
        cache.delete(&slot).unwrap();
        assert!(cache.get(&slot).is_none());
        // Deleting an absent slot is fine
        cache.delete(&slot).unwrap();
    }

    #[test]
    fn test_slot_ids() {
        assert_eq!(Slot::LatestLookup.id(), "latest_lookup");
        assert_eq!(
            Slot::Location(LocationKey::new("New York", "US")).id(),
            "new_york_us"
        );
    }
}
