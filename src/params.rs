//! Query parameter construction
//!
//! Fetch parameters for one logical request. Keys with absent values are
//! omitted from the outgoing query string entirely, never serialized empty.
//! List-valued parameters serialize as repeated keys on Helix
//! (`user_id=1&user_id=2`); a subset of legacy v5 endpoints comma-join
//! instead, which callers opt into with [`Params::set_joined`].

use indexmap::IndexMap;

/// A single query parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// One value, one key
    Single(String),
    /// Repeated key, one occurrence per value
    Many(Vec<String>),
}

/// Ordered query parameters for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: IndexMap<String, ParamValue>,
}

impl Params {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single-valued parameter
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        self.values
            .insert(key.into(), ParamValue::Single(value.to_string()));
    }

    /// Set a single-valued parameter, omitting the key when the value is absent
    pub fn set_opt(&mut self, key: impl Into<String>, value: Option<impl ToString>) {
        if let Some(value) = value {
            self.set(key, value);
        }
    }

    /// Set a list-valued parameter (repeated keys), omitting empty/absent lists
    pub fn set_list(&mut self, key: impl Into<String>, values: Option<Vec<String>>) {
        if let Some(values) = values {
            if !values.is_empty() {
                self.values.insert(key.into(), ParamValue::Many(values));
            }
        }
    }

    /// Set a list-valued parameter comma-joined into one key (legacy v5 style)
    pub fn set_joined(&mut self, key: impl Into<String>, values: Option<Vec<String>>) {
        if let Some(values) = values {
            if !values.is_empty() {
                self.set(key, values.join(","));
            }
        }
    }

    /// Remove a parameter
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.values.shift_remove(key)
    }

    /// Get a parameter value
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// Check whether no parameters are set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of parameter keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Expand into `(key, value)` pairs, one per occurrence of a repeated key
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.values.len());
        for (key, value) in &self.values {
            match value {
                ParamValue::Single(v) => pairs.push((key.clone(), v.clone())),
                ParamValue::Many(vs) => {
                    for v in vs {
                        pairs.push((key.clone(), v.clone()));
                    }
                }
            }
        }
        pairs
    }
}
