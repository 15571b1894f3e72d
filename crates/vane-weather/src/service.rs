//! Forecast resolution: decides between cache and network for each lookup.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::cache::{ForecastCache, Slot};
use crate::connectivity::Connectivity;
use crate::error::WeatherError;
use crate::favorites::FavoriteSet;
use crate::location::LocationKey;
use crate::provider::ForecastProvider;
use crate::types::Forecast;

/// Orchestrates cache, favorites, connectivity, and the remote provider.
///
/// Favorites are served from their keyed cache slot while inside the
/// freshness window; ad-hoc lookups always refetch when online and fall back
/// to the single latest-lookup slot when offline. The two slots are never
/// cross-checked: a favorite with no keyed entry fails offline even if the
/// latest-lookup slot happens to hold the same location, and changing a
/// location's favorite status does not move its payload between slots.
///
/// Lookups for the same key may race (say, an interactive lookup against the
/// bulk refresh). The worst case is a redundant fetch and a last-write-wins
/// overwrite of an idempotent entry, so no per-key locking is done. Writes
/// replace whole entries; an abandoned lookup cannot leave a partial one.
pub struct WeatherService {
    cache: ForecastCache,
    favorites: FavoriteSet,
    connectivity: Box<dyn Connectivity>,
    provider: ForecastProvider,
    max_age: Duration,
}

impl WeatherService {
    pub fn new(
        cache: ForecastCache,
        favorites: FavoriteSet,
        connectivity: Box<dyn Connectivity>,
        provider: ForecastProvider,
        max_age: Duration,
    ) -> Self {
        Self {
            cache,
            favorites,
            connectivity,
            provider,
            max_age,
        }
    }

    /// Resolve the forecast for `location`.
    ///
    /// `is_favorite` selects the caching policy; callers pass the location's
    /// current status (see [`WeatherService::is_favorite`]).
    ///
    /// # Errors
    /// Propagates fetch failures while online; returns
    /// [`WeatherError::NoDataOffline`] when offline with nothing cached.
    pub async fn forecast(
        &self,
        location: &LocationKey,
        is_favorite: bool,
    ) -> Result<Forecast, WeatherError> {
        if self.connectivity.is_online() {
            self.forecast_online(location, is_favorite).await
        } else {
            self.forecast_offline(location, is_favorite)
        }
    }

    async fn forecast_online(
        &self,
        location: &LocationKey,
        is_favorite: bool,
    ) -> Result<Forecast, WeatherError> {
        let slot = Slot::Location(location.clone());

        // Only favorites ever reuse a cached entry; ad-hoc lookups hit the
        // network on every online request.
        if is_favorite && self.cache.is_valid(&slot, self.max_age) {
            if let Some(forecast) = self.cache.get(&slot) {
                tracing::debug!("Serving {} from cache", location);
                return Ok(forecast);
            }
            // Entry vanished between the validity check and the read; fall
            // through to a fresh fetch.
            tracing::debug!("Cache entry for {} disappeared, refetching", location);
        }

        let fresh = self.provider.fetch(location).await?;

        let slot = if is_favorite { slot } else { Slot::LatestLookup };
        self.cache
            .put(&slot, &fresh)
            .map_err(storage_err)?;

        Ok(fresh)
    }

    fn forecast_offline(
        &self,
        location: &LocationKey,
        is_favorite: bool,
    ) -> Result<Forecast, WeatherError> {
        if is_favorite {
            self.cache
                .get(&Slot::Location(location.clone()))
                .ok_or_else(|| WeatherError::NoDataOffline(location.to_string()))
        } else {
            self.cache
                .get(&Slot::LatestLookup)
                .ok_or_else(|| WeatherError::NoDataOffline("the latest lookup".to_string()))
        }
    }

    /// Proactively refresh stale favorite entries, best-effort.
    ///
    /// Does nothing offline. Keys are refreshed sequentially, in the given
    /// order; failures for individual locations are logged and skipped so the
    /// remaining keys are still attempted. Nothing is reported back.
    pub async fn refresh_favorites_if_needed(&self, favorites: &[LocationKey]) {
        if !self.connectivity.is_online() {
            tracing::debug!("Offline, skipping favorites refresh");
            return;
        }

        for location in favorites {
            let slot = Slot::Location(location.clone());
            if self.cache.is_valid(&slot, self.max_age) {
                continue;
            }

            match self.provider.fetch(location).await {
                Ok(fresh) => {
                    if let Err(e) = self.cache.put(&slot, &fresh) {
                        tracing::warn!("Failed to cache refreshed forecast for {}: {}", location, e);
                    }
                }
                Err(e) => {
                    tracing::warn!("Refresh failed for {}: {}", location, e);
                }
            }
        }
    }

    /// When the data a lookup for `location` would serve was last fetched.
    pub fn last_updated(&self, location: &LocationKey, is_favorite: bool) -> Option<DateTime<Utc>> {
        if is_favorite {
            self.cache.last_updated(&Slot::Location(location.clone()))
        } else {
            self.cache.last_updated(&Slot::LatestLookup)
        }
    }

    /// Current favorites, in the order they were added.
    pub fn favorites(&self) -> Vec<LocationKey> {
        self.favorites.list()
    }

    pub fn is_favorite(&self, location: &LocationKey) -> bool {
        self.favorites.is_favorite(location)
    }

    /// Pin `location`. Its next lookups use the keyed cache slot.
    ///
    /// # Errors
    /// Returns [`WeatherError::Storage`] if the favorites list could not be
    /// persisted.
    pub fn add_favorite(&self, location: &LocationKey) -> Result<(), WeatherError> {
        self.favorites.add(location).map_err(storage_err)
    }

    /// Unpin `location` and drop its keyed cache entry. The latest-lookup
    /// slot is left alone.
    ///
    /// # Errors
    /// Returns [`WeatherError::Storage`] if the favorites list or cache
    /// could not be updated.
    pub fn remove_favorite(&self, location: &LocationKey) -> Result<bool, WeatherError> {
        let removed = self.favorites.remove(location).map_err(storage_err)?;
        if removed {
            self.cache
                .delete(&Slot::Location(location.clone()))
                .map_err(storage_err)?;
        }
        Ok(removed)
    }

    /// Drop the keyed cache entry for a favorite, then resolve again.
    ///
    /// For non-favorites this is just a resolve, which already refetches
    /// while online.
    ///
    /// # Errors
    /// Same as [`WeatherService::forecast`], plus [`WeatherError::Storage`]
    /// for cache failures.
    pub async fn force_refresh(
        &self,
        location: &LocationKey,
        is_favorite: bool,
    ) -> Result<Forecast, WeatherError> {
        if is_favorite {
            self.cache
                .delete(&Slot::Location(location.clone()))
                .map_err(storage_err)?;
        }
        self.forecast(location, is_favorite).await
    }
}

fn storage_err(e: anyhow::Error) -> WeatherError {
    WeatherError::Storage(e.to_string())
}
