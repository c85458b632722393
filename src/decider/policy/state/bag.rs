// SPDX-License-Identifier: MIT

//! Variable bag threaded through a policy traversal

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::value::Value;

/// Mutable key/value state of a single traversal
///
/// Starts as a copy of the caller's input and ends as the caller's output.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct VariableBag {
    fields: BTreeMap<String, Value>,
}

impl VariableBag {
    /// Create an empty bag
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set a variable, overwriting any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Get a variable value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for VariableBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
