//! Gateway configuration.

use serde::Deserialize;

/// Configuration for the gateway service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Account the ledger authority settles revenue and escrow against.
    #[serde(default = "defaults::authority_account")]
    pub authority_account: String,

    /// Content gateway base URLs, highest priority first.
    #[serde(default = "defaults::content_gateways")]
    pub content_gateways: Vec<String>,

    /// Ledger access endpoints, highest priority first.
    #[serde(default = "defaults::ledger_endpoints")]
    pub ledger_endpoints: Vec<String>,

    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    /// Endpoint health probe bound, milliseconds.
    #[serde(default = "defaults::probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Per-attempt bound for json fetches, milliseconds.
    #[serde(default = "defaults::json_timeout_ms")]
    pub json_timeout_ms: u64,

    /// Per-attempt bound for binary fetches, milliseconds.
    #[serde(default = "defaults::binary_timeout_ms")]
    pub binary_timeout_ms: u64,

    /// Outer bound for a whole content fetch, milliseconds. Zero derives
    /// `candidates * attempt + 2000` per call.
    #[serde(default = "defaults::fetch_deadline_ms")]
    pub fetch_deadline_ms: u64,

    /// Trailing ledger events the registry snapshot replays.
    #[serde(default = "defaults::collection_scan_window")]
    pub collection_scan_window: u64,

    /// Trailing ledger events the stats snapshot replays.
    #[serde(default = "defaults::stats_scan_window")]
    pub stats_scan_window: u64,

    /// Snapshot refresh period, milliseconds.
    #[serde(default = "defaults::refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            authority_account: defaults::authority_account(),
            content_gateways: defaults::content_gateways(),
            ledger_endpoints: defaults::ledger_endpoints(),
            bind_address: defaults::bind_address(),
            probe_timeout_ms: defaults::probe_timeout_ms(),
            json_timeout_ms: defaults::json_timeout_ms(),
            binary_timeout_ms: defaults::binary_timeout_ms(),
            fetch_deadline_ms: defaults::fetch_deadline_ms(),
            collection_scan_window: defaults::collection_scan_window(),
            stats_scan_window: defaults::stats_scan_window(),
            refresh_interval_ms: defaults::refresh_interval_ms(),
        }
    }
}

mod defaults {
    /// Comma-separated list from an env var; `None` when unset or empty.
    fn list_from_env(var: &str) -> Option<Vec<String>> {
        let raw = std::env::var(var).ok()?;
        let items: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if items.is_empty() {
            None
        } else {
            Some(items)
        }
    }

    pub fn authority_account() -> String {
        std::env::var("MINTBAY_AUTHORITY_ACCOUNT").unwrap_or_else(|_| "authority.mintbay".into())
    }

    pub fn content_gateways() -> Vec<String> {
        list_from_env("MINTBAY_CONTENT_GATEWAYS").unwrap_or_else(|| {
            vec![
                "https://ipfs.io/ipfs".into(),
                "https://cloudflare-ipfs.com/ipfs".into(),
                "https://dweb.link/ipfs".into(),
            ]
        })
    }

    pub fn ledger_endpoints() -> Vec<String> {
        list_from_env("MINTBAY_LEDGER_ENDPOINTS")
            .unwrap_or_else(|| vec!["http://127.0.0.1:3050".into()])
    }

    pub fn bind_address() -> String {
        "0.0.0.0:3050".into()
    }

    pub fn probe_timeout_ms() -> u64 {
        2_500
    }

    pub fn json_timeout_ms() -> u64 {
        5_000
    }

    pub fn binary_timeout_ms() -> u64 {
        5_000
    }

    pub fn fetch_deadline_ms() -> u64 {
        0
    }

    pub fn collection_scan_window() -> u64 {
        512
    }

    pub fn stats_scan_window() -> u64 {
        2_048
    }

    pub fn refresh_interval_ms() -> u64 {
        5_000
    }
}
