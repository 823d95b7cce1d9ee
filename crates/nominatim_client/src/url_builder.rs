//! Request URL assembly

use url::Url;

use crate::error::NominatimError;
use crate::params::ParameterMap;

/// Append `params` to `base` and parse the result
///
/// Values are emitted as they are stored, so the map should have been built
/// with URL encoding enabled. If `base` already carries a query string the
/// parameters are appended with `&`.
///
/// # Errors
///
/// Returns [`NominatimError::MalformedUrl`] if the assembled string is not
/// an absolute URL.
pub fn build_url(base: &str, params: &ParameterMap) -> Result<Url, NominatimError> {
    let mut url = String::with_capacity(base.len() + params.len() * 16);
    url.push_str(base.trim());

    let mut has_query = url.contains('?');
    for (key, value) in params {
        url.push(if has_query { '&' } else { '?' });
        has_query = true;
        url.push_str(key);
        url.push('=');
        url.push_str(value);
    }

    Url::parse(&url).map_err(|e| NominatimError::MalformedUrl {
        reason: e.to_string(),
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ParameterMap {
        let mut map = ParameterMap::new();
        for (key, value) in pairs {
            map.set(*key, *value);
        }
        map
    }

    #[test]
    fn test_base_without_query() {
        let url = build_url(
            "https://nominatim.openstreetmap.org/search",
            &params(&[("a", "1"), ("b", "2")]),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://nominatim.openstreetmap.org/search?a=1&b=2"
        );
    }

    #[test]
    fn test_base_with_query() {
        let url = build_url(
            "https://nominatim.example.org/search?x=1",
            &params(&[("a", "1")]),
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://nominatim.example.org/search?x=1&a=1");
    }

    #[test]
    fn test_empty_params_keeps_base() {
        let url = build_url("https://nominatim.example.org/reverse", &ParameterMap::new()).unwrap();
        assert_eq!(url.as_str(), "https://nominatim.example.org/reverse");
    }

    #[test]
    fn test_encoded_values_survive_parsing() {
        let url = build_url(
            "https://nominatim.example.org/search",
            &params(&[("q", "Unter+den+Linden+1%2C+Berlin")]),
        )
        .unwrap();
        assert!(url.as_str().ends_with("?q=Unter+den+Linden+1%2C+Berlin"));

        let q = url
            .query_pairs()
            .find(|(k, _)| k == "q")
            .map(|(_, v)| v.into_owned());
        assert_eq!(q.as_deref(), Some("Unter den Linden 1, Berlin"));
    }

    #[test]
    fn test_multiple_values_are_repeated() {
        let mut map = ParameterMap::new();
        map.add("tag", "a");
        map.add("tag", "b");
        let url = build_url("http://localhost/search", &map).unwrap();
        assert_eq!(url.as_str(), "http://localhost/search?tag=a&tag=b");
    }

    #[test]
    fn test_malformed_base() {
        let err = build_url("not a url", &params(&[("a", "1")])).unwrap_err();
        match err {
            NominatimError::MalformedUrl { url, .. } => assert_eq!(url, "not a url?a=1"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
