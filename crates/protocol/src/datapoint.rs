//! Data points for the `/api/put` route
//!
//! A [`DataPoint`] serializes to the JSON shape OpenTSDB accepts:
//!
//! ```json
//! {"metric":"sys.cpu.user","timestamp":1356998400,"value":42,"tags":{"host":"web01"}}
//! ```
//!
//! Tag maps serialize with keys in ascending order; [`Tags`] is backed by a
//! `BTreeMap` so the output is stable without an explicit sort.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Replace characters OpenTSDB rejects in metric and tag names.
///
/// Every code point that is not a letter, digit, `-`, `_`, `.` or `/` is
/// replaced with `replacement`. Idempotent for any replacement character.
pub fn sanitize(s: &str, replacement: char) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphabetic() || c.is_numeric() || matches!(c, '-' | '_' | '.' | '/') {
                c
            } else {
                replacement
            }
        })
        .collect()
}

/// A sample value - integer or floating point
///
/// The storage layer keeps the distinction (the cell qualifier carries a
/// float flag), so the decoder preserves it. Wire floats are binary32 or
/// binary64; both widen losslessly into `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Signed integer value
    Int(i64),
    /// Floating point value
    Float(f64),
}

impl Value {
    /// Numeric view of the value, losing the int/float distinction
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    /// True for the floating point variant
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float(_))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v as f64)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

/// Tag map with unique, sorted keys
///
/// [`Tags::set`] sanitizes both halves of a pair the way the ingest side
/// needs; [`Tags::insert`] stores a pair verbatim (the read path gets names
/// from the UID table, which are clean by construction).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    /// Create an empty tag map
    pub fn new() -> Self {
        Self::default()
    }

    /// Sanitize `key` and `value` with `_` and store the pair
    ///
    /// Pairs whose key or value sanitizes to the empty string are dropped.
    pub fn set(&mut self, key: &str, value: &str) {
        let key = sanitize(key, '_');
        let value = sanitize(value, '_');
        if !key.is_empty() && !value.is_empty() {
            self.0.insert(key, value);
        }
    }

    /// Store a pair verbatim, without sanitization
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up a tag value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of tag pairs
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no tags are set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate pairs in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tags = Self::new();
        for (k, v) in iter {
            tags.insert(k, v);
        }
        tags
    }
}

impl fmt::Display for Tags {
    /// OpenTSDB-style `{a=b,c=d}` rendering, alphabetized by key
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{key}={value}")?;
        }
        write!(f, "}}")
    }
}

/// A data point for the `/api/put` route
///
/// See <http://opentsdb.net/docs/build/html/api_http/put.html>.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Metric name
    pub metric: String,

    /// Unix timestamp in seconds
    pub timestamp: i64,

    /// Sample value
    pub value: Value,

    /// Tag pairs, keys unique
    pub tags: Tags,
}

impl DataPoint {
    /// Create a data point
    pub fn new(
        metric: impl Into<String>,
        timestamp: i64,
        value: impl Into<Value>,
        tags: Tags,
    ) -> Self {
        Self {
            metric: metric.into(),
            timestamp,
            value: value.into(),
            tags,
        }
    }
}

impl fmt::Display for DataPoint {
    /// `<metric> <timestamp> <value> <tagk=tagv> [<tagkN=tagvN>]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:3.6}", self.metric, self.timestamp, self.value.as_f64())?;
        for (key, value) in self.tags.iter() {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}
