//! Validated identifiers. Parsing is the only constructor for the string
//! ids, so a held value is always well-formed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

const MAX_ID_LEN: usize = 64;

/// Account identifier: 2..=64 chars of `[a-z0-9._-]`, where every
/// separator is surrounded by alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

fn valid_account(s: &str) -> bool {
    if s.len() < 2 || s.len() > MAX_ID_LEN {
        return false;
    }
    let mut prev_separator = true;
    for b in s.bytes() {
        match b {
            b'a'..=b'z' | b'0'..=b'9' => prev_separator = false,
            b'.' | b'_' | b'-' => {
                if prev_separator {
                    return false;
                }
                prev_separator = true;
            }
            _ => return false,
        }
    }
    !prev_separator
}

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if valid_account(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(ParseError::InvalidAccount(s.to_owned()))
        }
    }
}

impl TryFrom<String> for AccountId {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

/// Collection identifier: 1..=64 chars of `[a-z0-9_-]`, leading char
/// alphanumeric. Excludes `:` so token ids stay parseable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionId(String);

fn valid_collection(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_ID_LEN {
        return false;
    }
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(b'a'..=b'z') | Some(b'0'..=b'9') => {}
        _ => return false,
    }
    bytes.all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-'))
}

impl CollectionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CollectionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CollectionId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if valid_collection(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(ParseError::InvalidCollection(s.to_owned()))
        }
    }
}

impl TryFrom<String> for CollectionId {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CollectionId> for String {
    fn from(id: CollectionId) -> Self {
        id.0
    }
}

/// Token identifier `<collection>:<index>`. Indices are allocated
/// sequentially from 1 as editions mint.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenId {
    collection: CollectionId,
    index: u32,
}

impl TokenId {
    pub fn new(collection: CollectionId, index: u32) -> Self {
        Self { collection, index }
    }

    pub fn collection(&self) -> &CollectionId {
        &self.collection
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.collection, self.index)
    }
}

impl FromStr for TokenId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (collection, index) = s
            .split_once(':')
            .ok_or_else(|| ParseError::InvalidToken(s.to_owned()))?;
        let collection: CollectionId = collection
            .parse()
            .map_err(|_| ParseError::InvalidToken(s.to_owned()))?;
        let index: u32 = index
            .parse()
            .map_err(|_| ParseError::InvalidToken(s.to_owned()))?;
        Ok(Self { collection, index })
    }
}

impl TryFrom<String> for TokenId {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TokenId> for String {
    fn from(id: TokenId) -> Self {
        id.to_string()
    }
}

/// Marketplace-allocated listing identifier, monotonic per ledger.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ListingId(pub u64);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
