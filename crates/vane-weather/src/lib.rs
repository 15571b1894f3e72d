//! Weather lookups with offline caching for Vane.
//!
//! Resolves forecasts for (city, country) locations. Favorite locations are
//! served from a keyed persistent cache while fresh; ad-hoc lookups always
//! hit the network when online, with a single latest-lookup slot as the
//! offline fallback.

pub mod cache;
pub mod connectivity;
pub mod error;
pub mod favorites;
pub mod location;
pub mod provider;
pub mod service;
pub mod storage;
pub mod types;

pub use cache::{ForecastCache, Slot};
pub use connectivity::{Connectivity, TcpProbe};
pub use error::WeatherError;
pub use favorites::FavoriteSet;
pub use location::LocationKey;
pub use provider::ForecastProvider;
pub use service::WeatherService;
pub use storage::{DirStore, MemStore, SlotStore};
pub use types::{DayForecast, Forecast};
