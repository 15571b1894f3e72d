//! Location identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Canonical identity of a weather location: city plus country.
///
/// Equality and hashing use the normalized form (case-folded, whitespace
/// collapsed), so `("Lodz", "PL")` and `(" lodz ", "pl")` address the same
/// cache slot and favorites entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationKey {
    city: String,
    country: String,
}

impl LocationKey {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into().trim().to_string(),
            country: country.into().trim().to_string(),
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// Storage key for this location: lowercase, spaces to underscores, city
    /// and country joined with an underscore.
    ///
    /// `("New York", "US")` becomes `"new_york_us"`.
    pub fn slug(&self) -> String {
        format!("{}_{}", normalize(&self.city), normalize(&self.country))
    }

    /// Query form for the forecast API, e.g. `"Lodz,PL"`.
    pub fn query(&self) -> String {
        format!("{},{}", self.city, self.country)
    }
}

fn normalize(s: &str) -> String {
    s.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

impl PartialEq for LocationKey {
    fn eq(&self, other: &Self) -> bool {
        self.slug() == other.slug()
    }
}

impl Eq for LocationKey {}

impl Hash for LocationKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slug().hash(state);
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.city, self.country)
    }
}
