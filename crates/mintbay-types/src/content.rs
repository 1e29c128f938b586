//! Content locators: where off-ledger bytes or JSON live, plus the kind
//! tag callers request them as.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Address of a piece of content. `id` is the content identifier (or an
/// inline `data:` URI); `hints` are gateway base URLs tried before the
/// configured gateway list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentLocator {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl ContentLocator {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            hints: Vec::new(),
        }
    }

    pub fn with_hints(id: impl Into<String>, hints: Vec<String>) -> Self {
        Self {
            id: id.into(),
            hints,
        }
    }

    /// Inline locators resolve without network I/O.
    pub fn is_inline(&self) -> bool {
        self.id.starts_with("data:")
    }
}

impl fmt::Display for ContentLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Split a `data:` URI into (media type with parameters, payload).
/// Returns `None` when the input is not a data URI.
pub fn parse_data_uri(s: &str) -> Option<(&str, &str)> {
    let rest = s.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    Some((meta, payload))
}

/// What shape the caller expects resolved content in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Json,
    Binary,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Binary => "binary",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "binary" => Ok(Self::Binary),
            other => Err(format!("unknown content kind: {other}")),
        }
    }
}
