//! Nominatim CLI
//!
//! Command-line interface for forward and reverse geocoding.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use futures::TryStreamExt;
use nominatim_client::{
    BlockingNominatimClient, MAX_ZOOM, NominatimClient, NominatimConfig, OsmType, RequestOptions,
    ReverseSearchRequest, SearchRequest, StructuredQuery, ViewBox,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Nominatim CLI
#[derive(Debug, Parser)]
#[command(name = "nominatim")]
#[command(author, version, about = "Geocode addresses with Nominatim", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (TOML); `NOMINATIM_*` environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the blocking client instead of the async one
    #[arg(long, global = true)]
    blocking: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for a free-form query
    ///
    /// Example: nominatim search "Unter den Linden 1, Berlin" --country de
    Search {
        /// Query text
        query: String,

        #[command(flatten)]
        search: SearchArgs,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Search by address fields
    ///
    /// Example: nominatim structured --street "1 Unter den Linden" --city Berlin
    Structured {
        /// House number and street name
        #[arg(long)]
        street: Option<String>,

        /// City
        #[arg(long)]
        city: Option<String>,

        /// County
        #[arg(long)]
        county: Option<String>,

        /// State
        #[arg(long)]
        state: Option<String>,

        /// Country name
        #[arg(long = "country-name")]
        country: Option<String>,

        /// Postal code
        #[arg(long)]
        postal_code: Option<String>,

        #[command(flatten)]
        search: SearchArgs,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Find the place at a coordinate pair
    ///
    /// Example: nominatim reverse --lat 52.517 --lon 13.388
    Reverse {
        /// Latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Detail level from 0 (country) to 18 (building)
        #[arg(short, long, default_value_t = MAX_ZOOM, allow_hyphen_values = true)]
        zoom: i32,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Look up an OpenStreetMap object
    ///
    /// Example: nominatim lookup --osm-type W --osm-id 4045191
    Lookup {
        /// Object kind: N (node), W (way) or R (relation)
        #[arg(long)]
        osm_type: OsmType,

        /// Object id
        #[arg(long)]
        osm_id: String,

        /// Detail level from 0 (country) to 18 (building)
        #[arg(short, long, default_value_t = MAX_ZOOM, allow_hyphen_values = true)]
        zoom: i32,

        #[command(flatten)]
        options: OptionArgs,
    },
}

/// Options for the search endpoint
#[derive(Debug, Args)]
struct SearchArgs {
    /// Maximum number of results
    #[arg(short, long, default_value_t = 10, allow_hyphen_values = true)]
    limit: i64,

    /// Restrict results to a country (ISO 3166-1 alpha-2, repeatable)
    #[arg(short, long = "country")]
    countries: Vec<String>,

    /// Preferred area as `x1,y1,x2,y2`
    #[arg(long, allow_hyphen_values = true)]
    viewbox: Option<ViewBox>,

    /// Only return results inside the view box
    #[arg(long)]
    bounded: bool,

    /// Place ids to leave out (repeatable)
    #[arg(long = "exclude")]
    exclude_place_ids: Vec<String>,

    /// Keep duplicate results
    #[arg(long)]
    no_dedupe: bool,
}

/// Options understood by every endpoint
#[derive(Debug, Args)]
struct OptionArgs {
    /// Preferred result language, e.g. `en` or `de,en;q=0.5`
    #[arg(long)]
    language: Option<String>,

    /// Contact address sent along with the request
    #[arg(long)]
    email: Option<String>,

    /// Leave out the GeoJSON geometry
    #[arg(long)]
    no_polygon: bool,

    /// Leave out the address breakdown
    #[arg(long)]
    no_address_details: bool,

    /// Leave out extra tags
    #[arg(long)]
    no_extra_tags: bool,

    /// Leave out alternative names
    #[arg(long)]
    no_name_details: bool,
}

impl OptionArgs {
    fn apply(self, options: &mut RequestOptions) {
        options.accept_language = self.language;
        options.email = self.email;
        options.polygon = !self.no_polygon;
        options.address_details = !self.no_address_details;
        options.extra_tags = !self.no_extra_tags;
        options.name_details = !self.no_name_details;
    }
}

/// Request built from the command line
#[derive(Debug)]
enum Lookup {
    Search(SearchRequest),
    Reverse(ReverseSearchRequest),
}

impl SearchArgs {
    fn apply(self, request: SearchRequest) -> SearchRequest {
        let mut request = request
            .limit(self.limit)
            .country_codes(self.countries)
            .bounded(self.bounded)
            .exclude_place_ids(self.exclude_place_ids)
            .dedupe(!self.no_dedupe);
        if let Some(view_box) = self.viewbox {
            request = request.view_box(view_box);
        }
        request
    }
}

impl Commands {
    fn into_lookup(self) -> anyhow::Result<Lookup> {
        let lookup = match self {
            Self::Search {
                query,
                search,
                options,
            } => {
                if query.trim().is_empty() {
                    bail!("Search query must not be empty");
                }
                let mut request = search.apply(SearchRequest::free_text(query));
                options.apply(&mut request.options);
                Lookup::Search(request)
            },
            Self::Structured {
                street,
                city,
                county,
                state,
                country,
                postal_code,
                search,
                options,
            } => {
                let fields = StructuredQuery {
                    street,
                    city,
                    county,
                    state,
                    country,
                    postal_code,
                };
                if fields.is_empty() {
                    bail!("At least one address field is required");
                }
                let mut request = search.apply(SearchRequest::structured(fields));
                options.apply(&mut request.options);
                Lookup::Search(request)
            },
            Self::Reverse {
                lat,
                lon,
                zoom,
                options,
            } => {
                let mut request = ReverseSearchRequest::coordinates(lat, lon).zoom(zoom);
                options.apply(&mut request.options);
                Lookup::Reverse(request)
            },
            Self::Lookup {
                osm_type,
                osm_id,
                zoom,
                options,
            } => {
                let mut request = ReverseSearchRequest::osm_object(osm_type, osm_id).zoom(zoom);
                options.apply(&mut request.options);
                Lookup::Reverse(request)
            },
        };
        Ok(lookup)
    }
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

async fn run_async(config: &NominatimConfig, lookup: Lookup) -> anyhow::Result<serde_json::Value> {
    let client = NominatimClient::new(config)?;

    let value = match lookup {
        Lookup::Search(request) => {
            let results: Vec<_> = client.geocode(&request).try_collect().await?;
            info!(count = results.len(), "Search finished");
            serde_json::to_value(results)?
        },
        Lookup::Reverse(request) => {
            let result = client.reverse_geocode(&request).await?;
            info!(found = result.is_some(), "Reverse lookup finished");
            serde_json::to_value(result)?
        },
    };
    Ok(value)
}

async fn run_blocking(config: NominatimConfig, lookup: Lookup) -> anyhow::Result<serde_json::Value> {
    tokio::task::spawn_blocking(move || {
        let client = BlockingNominatimClient::new(&config)?;

        let value = match lookup {
            Lookup::Search(request) => {
                let results = client.geocode(&request)?;
                info!(count = results.len(), "Search finished");
                serde_json::to_value(results)?
            },
            Lookup::Reverse(request) => {
                let result = client.reverse_geocode(&request)?;
                info!(found = result.is_some(), "Reverse lookup finished");
                serde_json::to_value(result)?
            },
        };
        Ok::<_, anyhow::Error>(value)
    })
    .await
    .context("Blocking lookup task failed")?
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity; stdout is reserved for results
    let filter = log_filter_from_verbosity(cli.verbose);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = NominatimConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?;
    info!(search_url = %config.search_url, reverse_url = %config.reverse_url, "Configuration loaded");

    let lookup = cli.command.into_lookup()?;
    let value = if cli.blocking {
        run_blocking(config, lookup).await?
    } else {
        run_async(&config, lookup).await?
    };

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
