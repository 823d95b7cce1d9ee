//! Non-blocking Nominatim client
//!
//! Search results are delivered as a lazy stream and reverse lookups as a
//! lazy future. Nothing is sent before the first poll, every stream or
//! future performs exactly one HTTP call, and dropping it cancels that call.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::{self, BoxStream};
use futures::{FutureExt, StreamExt, TryStreamExt};
use reqwest::Client;
use reqwest::header::USER_AGENT;
use tracing::{Instrument, debug, debug_span, warn};
use url::Url;

#[cfg(test)]
use mockall::automock;

use crate::config::NominatimConfig;
use crate::error::NominatimError;
use crate::models::SearchResult;
use crate::request::{RequestParameters, ReverseSearchRequest, SearchRequest};
use crate::response::{decode_reverse_result, decode_search_results, read_body};
use crate::url_builder::build_url;

/// Stream of search results; errors arrive as items
pub type ResultStream = BoxStream<'static, Result<SearchResult, NominatimError>>;

/// Trait for geocoding clients
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GeocodingClient: Send + Sync {
    /// Search for places matching `request`
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>, NominatimError>;

    /// Look up the place at a coordinate pair or OSM object
    async fn reverse(
        &self,
        request: &ReverseSearchRequest,
    ) -> Result<Option<SearchResult>, NominatimError>;
}

/// Nominatim client on top of `reqwest`'s async API
///
/// Cheap to clone; clones share the underlying connection handling.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    config: NominatimConfig,
}

impl NominatimClient {
    /// Create a new non-blocking client
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

    /// Create a client on top of an existing async `reqwest` client
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
    /// The returned stream yields zero or more results. URL, transport,
    /// status and decode failures are yielded as a single `Err` item.
    pub fn geocode(&self, request: &SearchRequest) -> ResultStream {
        let url = build_url(&self.config.search_url, &request.build_parameters(true));
        let this = self.clone();
        let span = debug_span!("geocode");

        stream::once(
            async move {
                let body = this.fetch(url?).await?;
                let results = decode_search_results(&body)?;
                debug!(count = results.len(), "Geocoding finished");
                Ok::<_, NominatimError>(results)
            }
            .instrument(span),
        )
        .map_ok(|results| stream::iter(results.into_iter().map(Ok::<_, NominatimError>)))
        .try_flatten()
        .boxed()
    }

    /// Look up the place at a coordinate pair or OSM object
    ///
    /// Resolves to `Ok(None)` when the service finds nothing.
    pub fn reverse_geocode(
        &self,
        request: &ReverseSearchRequest,
    ) -> BoxFuture<'static, Result<Option<SearchResult>, NominatimError>> {
        let url = build_url(&self.config.reverse_url, &request.build_parameters(true));
        let this = self.clone();
        let span = debug_span!("reverse_geocode");

        async move {
            let body = this.fetch(url?).await?;
            let result = decode_reverse_result(&body)?;
            debug!(found = result.is_some(), "Reverse geocoding finished");
            Ok(result)
        }
        .instrument(span)
        .boxed()
    }

    async fn fetch(&self, url: Url) -> Result<String, NominatimError> {
        debug!(%url, "Sending Nominatim request");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.config.user_agent.as_str())
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await
            .map_err(|e| NominatimError::from_transport(e, self.config.timeout_secs))?;

        let status = response.status().as_u16();
        if status >= 400 {
            warn!(status, "Nominatim returned an error status");
        }

        read_body(status, response.text().await, self.config.timeout_secs)
    }
}

#[async_trait]
impl GeocodingClient for NominatimClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>, NominatimError> {
        self.geocode(request).try_collect().await
    }

    async fn reverse(
        &self,
        request: &ReverseSearchRequest,
    ) -> Result<Option<SearchResult>, NominatimError> {
        self.reverse_geocode(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_result(name: &str) -> SearchResult {
        SearchResult {
            display_name: Some(name.to_string()),
            lat: Some("52.52".to_string()),
            lon: Some("13.40".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_with_testing_config() {
        let client = NominatimClient::new(&NominatimConfig::for_testing()).unwrap();
        assert_eq!(client.config().timeout_secs, 5);
    }

    #[test]
    fn test_new_rejects_zero_timeout() {
        let config = NominatimConfig {
            timeout_secs: 0,
            ..NominatimConfig::for_testing()
        };
        assert!(NominatimClient::new(&config).is_err());
    }

    #[test]
    fn test_with_client_validates_config() {
        let config = NominatimConfig {
            search_url: " ".to_string(),
            ..NominatimConfig::for_testing()
        };
        let result = NominatimClient::with_client(&config, Client::new());
        assert!(matches!(result, Err(NominatimError::Configuration(_))));
    }

    #[test]
    fn test_malformed_url_surfaces_through_stream() {
        let config = NominatimConfig {
            search_url: "::not a url::".to_string(),
            ..NominatimConfig::for_testing()
        };
        let client = NominatimClient::new(&config).unwrap();

        // Building the stream must not fail eagerly
        let stream = client.geocode(&SearchRequest::free_text("Berlin"));
        let items: Vec<_> = tokio_test::block_on(stream.collect());

        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(NominatimError::MalformedUrl { .. })));
    }

    #[test]
    fn test_malformed_url_surfaces_through_future() {
        let config = NominatimConfig {
            reverse_url: String::from("reverse"),
            ..NominatimConfig::for_testing()
        };
        let client = NominatimClient::new(&config).unwrap();

        let result = tokio_test::block_on(
            client.reverse_geocode(&ReverseSearchRequest::coordinates(52.5, 13.4)),
        );
        assert!(matches!(result, Err(NominatimError::MalformedUrl { .. })));
    }

    #[test]
    fn test_mock_geocoding_client() {
        let mut mock = MockGeocodingClient::new();
        mock.expect_search()
            .times(1)
            .returning(|_| Ok(vec![search_result("Berlin")]));
        mock.expect_reverse().times(1).returning(|_| Ok(None));

        let results = tokio_test::block_on(mock.search(&SearchRequest::free_text("Berlin"))).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].has_lat_lon());

        let reverse =
            tokio_test::block_on(mock.reverse(&ReverseSearchRequest::coordinates(0.0, 0.0))).unwrap();
        assert!(reverse.is_none());
    }
}
