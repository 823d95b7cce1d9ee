//! Ordered query parameter map

/// Insertion-ordered multi-map from parameter name to values
///
/// Keys keep the position of their first insertion. Nominatim only ever
/// receives one value per key, but the map can hold several.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
    entries: Vec<(String, Vec<String>)>,
}

impl ParameterMap {
    /// Create an empty map
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Replace all values of `key` with `value`
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(idx) => self.entries[idx].1 = vec![value],
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Append `value` to the values of `key`
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(idx) => self.entries[idx].1.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// First value of `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key)
            .and_then(|idx| self.entries[idx].1.first())
            .map(String::as_str)
    }

    /// All values of `key`, empty if absent
    #[must_use]
    pub fn get_all(&self, key: &str) -> &[String] {
        self.position(key)
            .map(|idx| self.entries[idx].1.as_slice())
            .unwrap_or_default()
    }

    /// Whether `key` is present
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Number of distinct keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over keys with their first value, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(key, values)| {
            values
                .first()
                .map(|value| (key.as_str(), value.as_str()))
        })
    }

    /// Iterate over every key/value pair, repeating keys with several values
    pub fn iter_all(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(key, values)| {
            values
                .iter()
                .map(move |value| (key.as_str(), value.as_str()))
        })
    }

    /// Copy every key of `other` into this map, replacing existing values
    pub fn extend(&mut self, other: Self) {
        for (key, values) in other.entries {
            match self.position(&key) {
                Some(idx) => self.entries[idx].1 = values,
                None => self.entries.push((key, values)),
            }
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl<'a> IntoIterator for &'a ParameterMap {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter_all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut map = ParameterMap::new();
        map.set("a", "1");
        map.set("b", "2");
        map.set("a", "3");

        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_add_keeps_multiple_values() {
        let mut map = ParameterMap::new();
        map.add("tag", "x");
        map.add("tag", "y");

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("tag"), Some("x"));
        assert_eq!(map.get_all("tag"), ["x".to_string(), "y".to_string()]);
        assert_eq!(map.iter_all().count(), 2);
    }

    #[test]
    fn test_missing_key() {
        let map = ParameterMap::new();
        assert!(map.is_empty());
        assert_eq!(map.get("q"), None);
        assert!(map.get_all("q").is_empty());
        assert!(!map.contains_key("q"));
    }

    #[test]
    fn test_extend_overrides_existing_keys() {
        let mut base = ParameterMap::new();
        base.set("format", "jsonv2");
        base.set("limit", "5");

        let mut other = ParameterMap::new();
        other.set("limit", "10");
        other.set("q", "Berlin");

        base.extend(other);
        let pairs: Vec<_> = (&base).into_iter().collect();
        assert_eq!(
            pairs,
            vec![("format", "jsonv2"), ("limit", "10"), ("q", "Berlin")]
        );
    }
}
