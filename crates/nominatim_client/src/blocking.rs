//! Blocking Nominatim client
//!
//! Performs the HTTP round-trip on the calling thread. Must not be used from
//! within an async runtime; wrap calls in `spawn_blocking` there.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::NominatimConfig;
use crate::error::NominatimError;
use crate::models::SearchResult;
use crate::request::{RequestParameters, ReverseSearchRequest, SearchRequest};
use crate::response::{decode_reverse_result, decode_search_results, read_body};
use crate::url_builder::build_url;

/// Nominatim client on top of `reqwest`'s blocking API
#[derive(Debug, Clone)]
pub struct BlockingNominatimClient {
    client: Client,
    config: NominatimConfig,
}

impl BlockingNominatimClient {
    /// Create a new blocking client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &NominatimConfig) -> Result<Self, NominatimError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| NominatimError::Configuration(e.to_string()))?;

        Self::with_client(config, client)
    }

    /// Create a client on top of an existing blocking `reqwest` client
    ///
    /// Use this to share a connection pool or to configure proxies and TLS.
    /// URLs, `User-Agent` and timeout still come from `config` and are set
    /// on every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_client(config: &NominatimConfig, client: Client) -> Result<Self, NominatimError> {
        config.validate()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Configuration this client was built from
    #[must_use]
    pub const fn config(&self) -> &NominatimConfig {
        &self.config
    }

    /// Search for places matching `request`
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be built, the request fails, the
    /// service answers with a status >= 400 or the body cannot be decoded.
    #[instrument(skip(self, request))]
    pub fn geocode(&self, request: &SearchRequest) -> Result<Vec<SearchResult>, NominatimError> {
        let url = build_url(&self.config.search_url, &request.build_parameters(true))?;
        let body = self.fetch(url)?;
        let results = decode_search_results(&body)?;
        debug!(count = results.len(), "Geocoding finished");
        Ok(results)
    }

    /// Look up the place at a coordinate pair or OSM object
    ///
    /// Returns `Ok(None)` when the service finds nothing.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::geocode`].
    #[instrument(skip(self, request))]
    pub fn reverse_geocode(
        &self,
        request: &ReverseSearchRequest,
    ) -> Result<Option<SearchResult>, NominatimError> {
        let url = build_url(&self.config.reverse_url, &request.build_parameters(true))?;
        let body = self.fetch(url)?;
        let result = decode_reverse_result(&body)?;
        debug!(found = result.is_some(), "Reverse geocoding finished");
        Ok(result)
    }

    fn fetch(&self, url: Url) -> Result<String, NominatimError> {
        debug!(%url, "Sending Nominatim request");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.config.user_agent.as_str())
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .map_err(|e| NominatimError::from_transport(e, self.config.timeout_secs))?;

        let status = response.status().as_u16();
        if status >= 400 {
            warn!(status, "Nominatim returned an error status");
        }

        // Consuming the response returns the connection to the client
        read_body(status, response.text(), self.config.timeout_secs)
    }
}
