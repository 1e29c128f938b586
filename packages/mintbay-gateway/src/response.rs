//! Response payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use mintbay_types::{EventRecord, SeqNo};

/// Envelope for `POST /execute` outcomes.
#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecuteResponse {
    pub fn ok(result: Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub authority_account: String,
    pub ledger_head: SeqNo,
    pub collections: usize,
    pub uptime_secs: u64,
    pub requests: u64,
    pub feed_status: &'static str,
    pub endpoint_failovers: u64,
}

/// Head of the event log, served to remote readers.
#[derive(Debug, Serialize, Deserialize)]
pub struct HeadResponse {
    pub head: SeqNo,
}

/// An inclusive slice of the event log, served to remote readers.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventsResponse {
    pub events: Vec<EventRecord>,
}
