//! Named string multimaps attached to requests and replies.

use std::collections::BTreeMap;

/// A string key to ordered string values multimap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, Vec<String>>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Returns all values for `key` (empty if absent).
    pub fn lookup(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.lookup(key).first().map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.entries.remove(key)
    }

    /// Number of distinct keys.
    pub fn num_keys(&self) -> usize {
        self.entries.len()
    }

    /// Total number of values across all keys.
    pub fn num_values(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// A collection of [`Properties`] keyed by map name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertiesMap {
    maps: BTreeMap<String, Properties>,
}

impl PropertiesMap {
    pub const RANK: &'static str = "rank";
    pub const FEATURE_OVERRIDES: &'static str = "feature";
    pub const HIGHLIGHT_TERMS: &'static str = "highlightterms";
    pub const MATCH: &'static str = "match";
    pub const CACHES: &'static str = "caches";
    pub const TRACE: &'static str = "trace";

    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the named map, creating it if needed.
    pub fn lookup_create(&mut self, name: &str) -> &mut Properties {
        self.maps.entry(name.to_string()).or_default()
    }

    pub fn lookup(&self, name: &str) -> Option<&Properties> {
        self.maps.get(name)
    }

    pub fn rank_properties(&self) -> Option<&Properties> {
        self.lookup(Self::RANK)
    }

    pub fn feature_overrides(&self) -> Option<&Properties> {
        self.lookup(Self::FEATURE_OVERRIDES)
    }

    pub fn highlight_terms(&self) -> Option<&Properties> {
        self.lookup(Self::HIGHLIGHT_TERMS)
    }

    pub fn cache_properties(&self) -> Option<&Properties> {
        self.lookup(Self::CACHES)
    }

    /// Returns whether the named cache flag is set to `"true"`.
    pub fn cache_enabled(&self, cache: &str) -> bool {
        self.cache_properties()
            .and_then(|p| p.first(cache))
            .is_some_and(|v| v == "true")
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Properties)> {
        self.maps.iter().map(|(k, v)| (k.as_str(), v))
    }
}
