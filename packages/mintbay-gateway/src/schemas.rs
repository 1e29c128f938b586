//! Request payloads and query parameters.

use serde::Deserialize;

use mintbay_market::Action;
use mintbay_types::{AccountId, ContentKind, SeqNo};

/// Body of `POST /execute`: who is acting, and what they do.
#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub actor: AccountId,
    pub action: Action,
}

#[derive(Debug, Deserialize)]
pub struct ContentQuery {
    pub kind: ContentKind,
}

#[derive(Debug, Deserialize)]
pub struct EventRangeQuery {
    #[serde(default)]
    pub from: Option<SeqNo>,
    #[serde(default)]
    pub to: Option<SeqNo>,
}
