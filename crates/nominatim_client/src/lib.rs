//! Client for the Nominatim geocoding API
//!
//! Provides address search and reverse geocoding against
//! [Nominatim/OpenStreetMap](https://nominatim.openstreetmap.org) or any
//! self-hosted instance.
//!
//! # Architecture
//!
//! Requests ([`SearchRequest`], [`ReverseSearchRequest`]) render themselves
//! into a [`ParameterMap`] via [`RequestParameters`]; [`build_url`] turns the
//! map into the final request URL. Two transports share that logic:
//! [`BlockingNominatimClient`] runs on the calling thread, while
//! [`NominatimClient`] returns lazy streams and futures and implements the
//! [`GeocodingClient`] trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//! use nominatim_client::{NominatimClient, NominatimConfig, SearchRequest};
//!
//! let client = NominatimClient::new(&NominatimConfig::default())?;
//!
//! let request = SearchRequest::free_text("Unter den Linden 1, Berlin").limit(1);
//! let results: Vec<_> = client.geocode(&request).try_collect().await?;
//! ```

pub mod blocking;
mod client;
mod config;
mod error;
mod models;
mod params;
mod request;
mod response;
mod url_builder;

pub use blocking::BlockingNominatimClient;
pub use client::{GeocodingClient, NominatimClient, ResultStream};
pub use config::{DEFAULT_BASE_URL, ENV_PREFIX, NominatimConfig};
pub use error::{GENERAL_REQUEST_ERROR, MALFORMED_URL, NominatimError};
pub use models::{Address, SearchResult};
pub use params::ParameterMap;
pub use request::{
    DEFAULT_LANGUAGE, DEFAULT_LIMIT, MAX_ZOOM, MIN_ZOOM, OsmType, RequestOptions,
    RequestParameters, ReverseSearchRequest, ReverseTarget, SearchOptions, SearchQuery,
    SearchRequest, StructuredQuery, ViewBox, normalize_limit, normalize_zoom,
};
pub use url_builder::build_url;
