//! Weather-layer error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Transport or decode failure talking to the forecast API.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The forecast API answered with a non-success status.
    #[error("Weather API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Offline and nothing cached to serve. The payload names what was
    /// missing (a location, or the latest lookup).
    #[error("No connection and no cached data for {0}")]
    NoDataOffline(String),

    /// Local persistence failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl WeatherError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Network error. Check your connection.".to_string(),
            Self::Api { status, .. } if *status >= 500 => {
                "The weather service is having trouble. Please try again later.".to_string()
            }
            Self::Api { .. } => {
                "Weather lookup failed. Check the location and try again.".to_string()
            }
            Self::NoDataOffline(what) => {
                format!("No internet connection and no saved forecast for {}.", what)
            }
            Self::Storage(_) => "Could not access saved weather data.".to_string(),
        }
    }

    /// Whether this is the offline-with-no-cache case, which callers render
    /// differently from transient fetch failures.
    pub fn is_no_data_offline(&self) -> bool {
        matches!(self, Self::NoDataOffline(_))
    }
}
