//! Override configuration.
//!
//! [`Properties`] is an ordered list of string key/value pairs. For feature
//! overrides the key is a feature reference (`featureExpression` or
//! `featureExpression.outputName`) and the value is a decimal literal.
//! Entries that match nothing, or fail to parse, are ignored by consumers;
//! this tolerates stale or speculative configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Ordered string key/value configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Properties {
    entries: Vec<(String, String)>,
}

impl Properties {
    /// Create an empty property set.
    pub fn new() -> Self {
        Properties::default()
    }

    /// Append an entry. Duplicate keys are kept; consumers see entries in
    /// insertion order.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize from JSON produced by [`to_json`].
    ///
    /// [`to_json`]: Properties::to_json
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Properties::default());
        }
        Ok(serde_json::from_slice(bytes)?)
    }
}
