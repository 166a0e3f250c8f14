//! Allowed-origin tokens for a feature directive.
//!
//! The header grammar knows three values: `*` (unquoted) and the keywords
//! `'self'` / `'none'` (single-quoted).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{FpolicyError, Result};

/// Allowed origin for a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Any origin (`*`).
    Any,
    /// Same origin only (`'self'`).
    SelfOrigin,
    /// Feature disallowed everywhere (`'none'`).
    None,
}

impl Origin {
    /// All origins in admin-form order.
    pub const ALL: [Origin; 3] = [Origin::Any, Origin::SelfOrigin, Origin::None];

    /// Header token, quoted where the grammar requires it.
    pub fn as_token(self) -> &'static str {
        match self {
            Origin::Any => "*",
            Origin::SelfOrigin => "'self'",
            Origin::None => "'none'",
        }
    }

    /// Human-readable label used by the admin form.
    pub fn label(self) -> &'static str {
        match self {
            Origin::Any => "Any",
            Origin::SelfOrigin => "Self",
            Origin::None => "None",
        }
    }

    /// Parse an exact header token. Returns `None` for anything else.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "*" => Some(Origin::Any),
            "'self'" => Some(Origin::SelfOrigin),
            "'none'" => Some(Origin::None),
            _ => None,
        }
    }

    /// Accept either a header token or a bare keyword (`any`, `self`, `none`,
    /// case-insensitive). Used for hand-written config files.
    pub fn from_keyword(s: &str) -> Option<Self> {
        if let Some(o) = Self::from_token(s) {
            return Some(o);
        }
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Some(Origin::Any),
            "self" => Some(Origin::SelfOrigin),
            "none" => Some(Origin::None),
            _ => None,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

impl FromStr for Origin {
    type Err = FpolicyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_token(s)
            .ok_or_else(|| FpolicyError::BadRequest(format!("unknown origin token: {s}")))
    }
}

impl Serialize for Origin {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_token())
    }
}

impl<'de> Deserialize<'de> for Origin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Origin::from_keyword(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown origin: {s}")))
    }
}
