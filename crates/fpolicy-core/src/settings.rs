//! Stored per-feature overrides.
//!
//! The stored shape is `{ "<feature>": ["<origin-token>"] }`. Values are kept
//! as raw JSON so that a malformed entry survives until resolution, where it
//! is treated as "no override" for that feature only. Only index 0 of each
//! list is read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::Catalog;
use crate::error::{FpolicyError, Result};
use crate::origin::Origin;

/// Administrator overrides keyed by feature name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct SettingsSnapshot {
    entries: BTreeMap<String, Value>,
}

impl SettingsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coerce any stored value into a snapshot. Non-objects become `{}`.
    pub fn sanitize(value: Value) -> Self {
        match value {
            Value::Object(map) => Self {
                entries: map.into_iter().collect(),
            },
            other => {
                if !other.is_null() {
                    tracing::warn!(kind = %json_kind(&other), "stored settings are not a mapping; using empty settings");
                }
                Self::default()
            }
        }
    }

    /// Override for one feature.
    ///
    /// `Ok(None)` when nothing is stored, `Err(MalformedOverride)` when the
    /// stored value has the wrong shape or an unknown token.
    pub fn override_for(&self, name: &str) -> Result<Option<Origin>> {
        let Some(value) = self.entries.get(name) else {
            return Ok(None);
        };
        let malformed = |reason: &str| FpolicyError::MalformedOverride {
            feature: name.to_string(),
            reason: reason.to_string(),
        };
        let Value::Array(list) = value else {
            return Err(malformed("expected a list"));
        };
        match list.first() {
            None => Err(malformed("empty list")),
            Some(Value::String(token)) => Origin::from_token(token)
                .map(Some)
                .ok_or_else(|| malformed("unknown origin token")),
            Some(_) => Err(malformed("first element is not a string")),
        }
    }

    /// Store `origin` for `name` as a one-element list.
    pub fn set(&mut self, name: impl Into<String>, origin: Origin) {
        self.entries.insert(
            name.into(),
            Value::Array(vec![Value::String(origin.as_token().to_string())]),
        );
    }

    /// Store a raw value verbatim.
    pub fn set_raw(&mut self, name: impl Into<String>, value: Value) {
        self.entries.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a snapshot from admin form selections (`feature`, `token`).
    ///
    /// Names outside the catalog and invalid tokens are dropped.
    pub fn from_selections<'a, I>(catalog: &Catalog, selections: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut out = Self::default();
        for (name, token) in selections {
            if !catalog.contains(name) {
                tracing::debug!(feature = %name, "ignoring selection for unknown feature");
                continue;
            }
            match Origin::from_token(token) {
                Some(origin) => out.set(name, origin),
                None => tracing::debug!(feature = %name, token = %token, "ignoring invalid origin token"),
            }
        }
        out
    }
}

impl From<Value> for SettingsSnapshot {
    fn from(value: Value) -> Self {
        Self::sanitize(value)
    }
}

impl From<SettingsSnapshot> for Value {
    fn from(s: SettingsSnapshot) -> Self {
        Value::Object(s.entries.into_iter().collect())
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
