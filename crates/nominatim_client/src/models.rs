//! Nominatim response models
//!
//! Typed representations of the `jsonv2` result objects returned by the
//! search and reverse endpoints. The service adds fields over time; anything
//! not modelled here is kept in the `unknown` maps and written back out on
//! serialization.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::request::OsmType;

/// A single search or reverse search result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Internal Nominatim place id
    #[serde(
        default,
        deserialize_with = "number_or_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub place_id: Option<u64>,
    /// Data licence notice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licence: Option<String>,
    /// OSM object kind (`node`, `way`, `relation`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osm_type: Option<String>,
    /// OSM object id
    #[serde(
        default,
        deserialize_with = "number_or_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub osm_id: Option<u64>,
    /// Latitude as sent by the service (decimal string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<String>,
    /// Longitude as sent by the service (decimal string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<String>,
    /// Full comma-separated address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Search rank of the place
    #[serde(
        default,
        deserialize_with = "number_or_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub place_rank: Option<u32>,
    /// Main OSM tag key (e.g. `building`, `highway`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Main OSM tag value
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub place_type: Option<String>,
    /// Relevance between 0 and 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<f64>,
    /// Address rank label (e.g. `road`, `city`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresstype: Option<String>,
    /// Place name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Icon URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// South, north, west, east as decimal strings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundingbox: Option<Vec<String>>,
    /// Address breakdown (`addressdetails=1`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// Additional tags (`extratags=1`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extratags: Option<BTreeMap<String, Value>>,
    /// Alternative names (`namedetails=1`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namedetails: Option<BTreeMap<String, Value>>,
    /// Result geometry (`polygon_geojson=1`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geojson: Option<geojson::Geometry>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

impl SearchResult {
    /// Latitude in degrees, if present and numeric
    #[must_use]
    pub fn latitude(&self) -> Option<f64> {
        parse_coordinate(self.lat.as_deref())
    }

    /// Longitude in degrees, if present and numeric
    #[must_use]
    pub fn longitude(&self) -> Option<f64> {
        parse_coordinate(self.lon.as_deref())
    }

    /// Whether both coordinates are present and numeric
    #[must_use]
    pub fn has_lat_lon(&self) -> bool {
        self.coordinates().is_some()
    }

    /// `(latitude, longitude)` in degrees
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude()?, self.longitude()?))
    }

    /// Bounding box as `[south, north, west, east]`
    #[must_use]
    pub fn bounding_box(&self) -> Option<[f64; 4]> {
        let raw = self.boundingbox.as_ref()?;
        if raw.len() != 4 {
            return None;
        }
        let mut bbox = [0.0; 4];
        for (slot, value) in bbox.iter_mut().zip(raw) {
            *slot = parse_coordinate(Some(value))?;
        }
        Some(bbox)
    }

    /// OSM object kind, parsed
    #[must_use]
    pub fn osm_kind(&self) -> Option<OsmType> {
        self.osm_type.as_deref().and_then(OsmType::from_value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString<T> {
    Number(T),
    Text(String),
}

/// Accept ids and ranks both as JSON numbers and as numeric strings
///
/// Older Nominatim releases quote them; a blank string counts as absent.
fn number_or_string<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Option::<NumberOrString<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(value)) => Ok(Some(value)),
        Some(NumberOrString::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                Ok(None)
            } else {
                text.parse()
                    .map(Some)
                    .map_err(|e| serde::de::Error::custom(format!("invalid number '{text}': {e}")))
            }
        },
    }
}

fn parse_coordinate(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Address breakdown of a result
///
/// Field names follow the service; which ones are present depends on the
/// place and the country.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Building name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    /// House number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
    /// Street
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road: Option<String>,
    /// Neighbourhood
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighbourhood: Option<String>,
    /// Suburb
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suburb: Option<String>,
    /// City district
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_district: Option<String>,
    /// City
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Town
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    /// Village
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub village: Option<String>,
    /// Hamlet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hamlet: Option<String>,
    /// Municipality
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
    /// County
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    /// State
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Postal code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    /// Country name in the requested language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// ISO 3166-1 alpha-2 country code, lower case
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// Continent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continent: Option<String>,
    /// Public building name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_building: Option<String>,
    /// Tram stop name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tram_stop: Option<String>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

impl Address {
    /// The most specific settlement name available
    ///
    /// Nominatim puts the settlement into `city`, `town`, `village` and so on
    /// depending on its size; this checks them from largest to smallest.
    #[must_use]
    pub fn find_city(&self) -> Option<&str> {
        [
            &self.city,
            &self.town,
            &self.village,
            &self.municipality,
            &self.hamlet,
            &self.suburb,
            &self.city_district,
        ]
        .into_iter()
        .find_map(|field| field.as_deref().filter(|v| !v.trim().is_empty()))
    }

    /// Upper-case ISO country code
    #[must_use]
    pub fn iso_country_code(&self) -> Option<String> {
        self.country_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_ascii_uppercase)
    }

    /// Single-line postal address, e.g. `Unter den Linden 1, 10117 Berlin, Deutschland`
    #[must_use]
    pub fn formatted_address(&self) -> Option<String> {
        let street = join_present(&[self.road.as_deref(), self.house_number.as_deref()]);
        let locality = join_present(&[self.postcode.as_deref(), self.find_city()]);
        let parts: Vec<String> = [street, locality, self.country.clone()]
            .into_iter()
            .flatten()
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

fn join_present(parts: &[Option<&str>]) -> Option<String> {
    let present: Vec<&str> = parts
        .iter()
        .flatten()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if present.is_empty() {
        None
    } else {
        Some(present.join(" "))
    }
}
