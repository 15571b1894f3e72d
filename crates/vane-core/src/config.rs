use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration and data directory
    pub config_dir: PathBuf,

    /// Weather lookup settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Connectivity probe settings
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// WeatherAPI key, see https://www.weatherapi.com/
    #[serde(default)]
    pub api_key: String,

    /// Forecast API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// How long a cached favorite forecast stays fresh, in minutes
    #[serde(default = "default_cache_max_age_minutes")]
    pub cache_max_age_minutes: u64,

    /// Network timeout for a single forecast fetch, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Number of forecast days to request
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,

    /// Refresh interval for the watch mode, in minutes
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u32,
}

fn default_api_base_url() -> String {
    "https://api.weatherapi.com/v1".to_string()
}

fn default_cache_max_age_minutes() -> u64 {
    180
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_forecast_days() -> u32 {
    9
}

fn default_refresh_minutes() -> u32 {
    15
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: default_api_base_url(),
            cache_max_age_minutes: default_cache_max_age_minutes(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            forecast_days: default_forecast_days(),
            refresh_minutes: default_refresh_minutes(),
        }
    }
}

impl WeatherConfig {
    /// Freshness window for cached favorite forecasts
    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_minutes * 60)
    }

    /// Timeout for a single forecast fetch
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    /// host:port the online check connects to
    #[serde(default = "default_probe_addr")]
    pub probe_addr: String,

    /// Connect timeout for the online check, in milliseconds
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

fn default_probe_addr() -> String {
    "api.weatherapi.com:443".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    1500
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_addr: default_probe_addr(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl ConnectivityConfig {
    /// Connect timeout for the online check
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vane");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            connectivity: ConnectivityConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(&config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(
            &self.weather.api_base_url,
            "weather.api_base_url",
            &mut result,
        );

        if self.weather.api_key.is_empty() {
            result.add_warning(
                "weather.api_key",
                "No API key configured - forecast lookups will fail",
            );
        }

        if self.weather.cache_max_age_minutes == 0 {
            result.add_warning(
                "weather.cache_max_age_minutes",
                "Caching disabled (0 minutes) - favorites refetch on every lookup",
            );
        }

        if self.weather.fetch_timeout_secs == 0 {
            result.add_error(
                "weather.fetch_timeout_secs",
                "Fetch timeout must be greater than 0",
            );
        }

        if self.weather.forecast_days == 0 {
            result.add_error("weather.forecast_days", "Must request at least 1 day");
        } else if self.weather.forecast_days > 14 {
            result.add_warning(
                "weather.forecast_days",
                "The forecast API caps requests at 14 days",
            );
        }

        if self.weather.refresh_minutes == 0 {
            result.add_warning(
                "weather.refresh_minutes",
                "Watch-mode refresh disabled (0 minutes)",
            );
        }

        if !self.connectivity.probe_addr.contains(':') {
            result.add_error(
                "connectivity.probe_addr",
                "Probe address must be host:port",
            );
        }

        if self.connectivity.probe_timeout_ms == 0 {
            result.add_error(
                "connectivity.probe_timeout_ms",
                "Probe timeout must be greater than 0",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Directory holding the per-location forecast cache files
    pub fn weather_cache_dir(&self) -> PathBuf {
        self.config_dir.join("weather_cache")
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("vane");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        // Default config should be valid (only warnings, no errors)
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_missing_api_key_is_warning() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "weather.api_key"));
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = Config::default();
        config.weather.api_base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "weather.api_base_url"));
    }

    #[test]
    fn test_invalid_base_url_scheme() {
        let mut config = Config::default();
        config.weather.api_base_url = "ftp://api.weatherapi.com/v1".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_fetch_timeout_is_error() {
        let mut config = Config::default();
        config.weather.fetch_timeout_secs = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "weather.fetch_timeout_secs"));
    }

    #[test]
    fn test_zero_cache_age_is_warning() {
        let mut config = Config::default();
        config.weather.cache_max_age_minutes = 0;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "weather.cache_max_age_minutes"));
    }

    #[test]
    fn test_excessive_forecast_days_is_warning() {
        let mut config = Config::default();
        config.weather.forecast_days = 20;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "weather.forecast_days"));
    }

    #[test]
    fn test_probe_addr_without_port_is_error() {
        let mut config = Config::default();
        config.connectivity.probe_addr = "api.weatherapi.com".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_cache_max_age_conversion() {
        let mut weather = WeatherConfig::default();
        weather.cache_max_age_minutes = 2;
        assert_eq!(weather.cache_max_age(), Duration::from_secs(120));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
