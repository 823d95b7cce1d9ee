//! Response status checking and body decoding shared by both transports

use serde_json::Value;

use crate::error::NominatimError;
use crate::models::SearchResult;

/// Turn a status code and the (possibly failed) body read into the body text
///
/// Statuses >= 400 become [`NominatimError::Http`]; reading their body is
/// best-effort and an unreadable body is reported as empty.
pub(crate) fn read_body(
    status: u16,
    text: Result<String, reqwest::Error>,
    timeout_secs: u64,
) -> Result<String, NominatimError> {
    if status >= 400 {
        return Err(NominatimError::Http {
            status,
            body: text.unwrap_or_default(),
        });
    }
    text.map_err(|e| NominatimError::from_transport(e, timeout_secs))
}

/// Decode a search response body
///
/// A missing body or a JSON `null` yields an empty list.
pub(crate) fn decode_search_results(body: &str) -> Result<Vec<SearchResult>, NominatimError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }
    let results: Option<Vec<SearchResult>> =
        serde_json::from_str(body).map_err(NominatimError::Decode)?;
    Ok(results.unwrap_or_default())
}

/// Decode a reverse search response body
///
/// Nominatim answers lookups that match nothing with `{"error": "..."}`;
/// those, an empty body and `null` all yield `None`.
pub(crate) fn decode_reverse_result(body: &str) -> Result<Option<SearchResult>, NominatimError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(body).map_err(NominatimError::Decode)?;
    if value.is_null() || value.get("error").is_some() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(NominatimError::Decode)
}
