//! Request parameters and the canonical query string
//!
//! The canonical string is the exact byte sequence that gets signed and sent.
//! Keys are sorted byte-wise, absent values are dropped, and keys and values
//! are form-encoded (`A-Z a-z 0-9 - _ . ~` literal, space as `+`, everything
//! else as uppercase `%XX` over UTF-8).

use std::collections::HashMap;
use std::fmt;

use tradewire_core::Fixed;

/// A single request parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    UInt(u64),
    Decimal(Fixed),
    Bool(bool),
    /// Present in the map but never transmitted
    Null,
}

impl ParamValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    /// Wire text before percent-encoding; `None` for `Null`.
    pub fn to_wire_string(&self) -> Option<String> {
        match self {
            ParamValue::Text(s) => Some(s.clone()),
            ParamValue::Int(v) => Some(v.to_string()),
            ParamValue::UInt(v) => Some(v.to_string()),
            ParamValue::Decimal(v) => Some(v.to_wire_string()),
            ParamValue::Bool(true) => Some("true".to_string()),
            ParamValue::Bool(false) => Some("false".to_string()),
            ParamValue::Null => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_wire_string() {
            Some(s) => f.write_str(&s),
            None => f.write_str("null"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value as i64)
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::UInt(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::UInt(value as u64)
    }
}

impl From<Fixed> for ParamValue {
    fn from(value: Fixed) -> Self {
        ParamValue::Decimal(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::Null, Into::into)
    }
}

/// Unordered request parameters
///
/// Insertion order carries no meaning; ordering is imposed by
/// [`CanonicalQuery::build`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
    entries: HashMap<String, ParamValue>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Builder-style `insert`
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert only when the key is missing or holds `Null`
    pub fn set_default(&mut self, key: &str, value: impl Into<ParamValue>) -> &mut Self {
        if !self.contains(key) {
            self.entries.insert(key.to_string(), value.into());
        }
        self
    }

    /// Merge `other` over this map; colliding keys take `other`'s value
    pub fn overlay(&mut self, other: &ParameterMap) -> &mut Self {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    /// True when the key holds a transmittable value
    pub fn contains(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|v| !v.is_null())
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Transmittable `(key, wire text)` pairs in arbitrary order
    pub fn present(&self) -> impl Iterator<Item = (&str, String)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.to_wire_string().map(|s| (k.as_str(), s)))
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ParameterMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<K: Into<String>, V: Into<ParamValue>> Extend<(K, V)> for ParameterMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// Sorted, encoded query string plus the entries it was built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalQuery {
    query: String,
    entries: Vec<(String, String)>,
}

impl CanonicalQuery {
    /// Canonicalize a parameter map. Pure and deterministic.
    pub fn build(params: &ParameterMap) -> Self {
        let mut entries: Vec<(String, String)> = params
            .present()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        // String's Ord is byte-wise
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let query = entries
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect::<Vec<_>>()
            .join("&");

        Self { query, entries }
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }

    /// Unencoded `(key, value)` pairs in transmission order
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// Canonical string with the signature appended, ready to transmit
    pub fn with_signature(&self, signature: &str) -> String {
        if self.query.is_empty() {
            format!("signature={signature}")
        } else {
            format!("{}&signature={signature}", self.query)
        }
    }

    pub fn into_string(self) -> String {
        self.query
    }
}

impl fmt::Display for CanonicalQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query)
    }
}

/// Form-encode one key or value
///
/// `urlencoding` leaves exactly the unreserved set literal and writes
/// uppercase hex; only the space needs rewriting.
pub fn encode_component(raw: &str) -> String {
    urlencoding::encode(raw).replace("%20", "+")
}
