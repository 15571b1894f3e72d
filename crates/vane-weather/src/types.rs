//! Forecast payload types.
//!
//! These are immutable once fetched; the cache layer stores and returns them
//! unmodified.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::location::LocationKey;

/// A single day of forecast data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub avg_temp_c: f64,
    pub avg_humidity_pct: f64,
    pub uv_index: f64,
    /// Human-readable condition, e.g. "Partly cloudy"
    pub condition: String,
    /// Condition icon URL as reported by the API
    pub icon_url: String,
}

/// Complete forecast bundle for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub location_name: String,
    pub location_country: String,
    pub days: Vec<DayForecast>,
}

impl Forecast {
    /// The location this forecast describes, as reported by the API.
    pub fn location_key(&self) -> LocationKey {
        LocationKey::new(self.location_name.as_str(), self.location_country.as_str())
    }
}
