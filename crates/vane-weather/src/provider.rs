//! Remote forecast API client.
//!
//! Talks to the WeatherAPI `forecast.json` endpoint and maps its wire shape
//! into the domain [`Forecast`].

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::error::WeatherError;
use crate::location::LocationKey;
use crate::types::{DayForecast, Forecast};

const WEATHER_API_BASE: &str = "https://api.weatherapi.com/v1";

/// Client for the remote forecast API.
#[derive(Debug, Clone)]
pub struct ForecastProvider {
    client: Client,
    api_key: String,
    base_url: String,
    days: u32,
}

impl ForecastProvider {
    /// Create a provider against the production API.
    ///
    /// # Errors
    /// Returns an error if the HTTP client could not be built.
    pub fn new(
        api_key: impl Into<String>,
        timeout: Duration,
        days: u32,
    ) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, timeout, days, WEATHER_API_BASE)
    }

    /// Create a provider against a different base URL (configuration, tests).
    ///
    /// # Errors
    /// Returns an error if the HTTP client could not be built.
    pub fn with_base_url(
        api_key: impl Into<String>,
        timeout: Duration,
        days: u32,
        base_url: &str,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            days,
        })
    }

    /// Fetch the forecast for `location`.
    ///
    /// # Errors
    /// Returns [`WeatherError::Network`] for transport/decode failures and
    /// [`WeatherError::Api`] for non-success statuses.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(&self, location: &LocationKey) -> Result<Forecast, WeatherError> {
        let url = format!("{}/forecast.json", self.base_url);
        let query = location.query();
        let days = self.days.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query.as_str()),
                ("days", days.as_str()),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::debug!("Forecast API returned {} for {}", status, location);
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ApiResponse = response.json().await?;
        Ok(body.into_forecast())
    }
}

// Wire model, field names as served by the API.

#[derive(Debug, Deserialize)]
struct ApiResponse {
    location: ApiLocation,
    forecast: ApiForecast,
}

#[derive(Debug, Deserialize)]
struct ApiLocation {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct ApiForecast {
    forecastday: Vec<ApiForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ApiForecastDay {
    date: NaiveDate,
    day: ApiDay,
}

#[derive(Debug, Deserialize)]
struct ApiDay {
    avgtemp_c: f64,
    avghumidity: f64,
    uv: f64,
    condition: ApiCondition,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    text: String,
    icon: String,
}

impl ApiResponse {
    fn into_forecast(self) -> Forecast {
        Forecast {
            location_name: self.location.name,
            location_country: self.location.country,
            days: self
                .forecast
                .forecastday
                .into_iter()
                .map(|day| DayForecast {
                    date: day.date,
                    avg_temp_c: day.day.avgtemp_c,
                    avg_humidity_pct: day.day.avghumidity,
                    uv_index: day.day.uv,
                    condition: day.day.condition.text,
                    icon_url: day.day.condition.icon,
                })
                .collect(),
        }
    }
}
