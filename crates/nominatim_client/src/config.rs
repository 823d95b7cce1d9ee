//! Nominatim client configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::NominatimError;

/// Public Nominatim instance operated by the OpenStreetMap Foundation
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Prefix for environment variable overrides (e.g. `NOMINATIM_USER_AGENT`)
pub const ENV_PREFIX: &str = "NOMINATIM";

/// Configuration for the Nominatim clients
///
/// Holds only immutable values, so one configuration can back any number of
/// clients on any number of threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominatimConfig {
    /// Endpoint for search (geocoding) requests
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Endpoint for reverse geocoding requests
    #[serde(default = "default_reverse_url")]
    pub reverse_url: String,

    /// Value of the `User-Agent` header; the usage policy requires one that
    /// identifies the application
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_search_url() -> String {
    format!("{DEFAULT_BASE_URL}/search")
}

fn default_reverse_url() -> String {
    format!("{DEFAULT_BASE_URL}/reverse")
}

fn default_user_agent() -> String {
    concat!("nominatim-client/", env!("CARGO_PKG_VERSION")).to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            reverse_url: default_reverse_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl NominatimConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            user_agent: "nominatim-client-tests".to_string(),
            ..Default::default()
        }
    }

    /// Point both endpoints at `<base_url>/search` and `<base_url>/reverse`
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.search_url = format!("{base}/search");
        self.reverse_url = format!("{base}/reverse");
        self
    }

    /// Load configuration from defaults, an optional file and the environment
    ///
    /// Later sources override earlier ones: built-in defaults, then the file
    /// at `path` (format derived from its extension), then `NOMINATIM_*`
    /// environment variables such as `NOMINATIM_SEARCH_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or the merged values do
    /// not deserialize.
    pub fn load(path: Option<&Path>) -> Result<Self, NominatimError> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("search_url", defaults.search_url)
            .and_then(|b| b.set_default("reverse_url", defaults.reverse_url))
            .and_then(|b| b.set_default("user_agent", defaults.user_agent))
            .and_then(|b| b.set_default("timeout_secs", defaults.timeout_secs))
            .map_err(|e| NominatimError::Configuration(e.to_string()))?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| NominatimError::Configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), NominatimError> {
        if self.search_url.trim().is_empty() {
            return Err(NominatimError::Configuration(
                "search_url must not be empty".to_string(),
            ));
        }

        if self.reverse_url.trim().is_empty() {
            return Err(NominatimError::Configuration(
                "reverse_url must not be empty".to_string(),
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(NominatimError::Configuration(
                "user_agent must not be empty".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(NominatimError::Configuration(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
