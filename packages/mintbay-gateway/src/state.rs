//! Shared application state.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::info;

use mintbay_market::{
    CollectionSummary, CollectionTradeStats, MarketLedger, MemoryAuthority, SystemClock,
};
use mintbay_types::{AccountId, CollectionId, SeqNo};

use crate::config::Config;
use crate::content::{ContentResolver, HttpFetch};
use crate::endpoints::{EndpointResolver, HttpProbe};
use crate::error::Error;
use crate::ledger_client::LedgerAccessClient;

/// Registry view published by the refresher and read by handlers without
/// touching the ledger.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub head: SeqNo,
    pub collections: Vec<CollectionSummary>,
    pub stats: BTreeMap<CollectionId, CollectionTradeStats>,
}

pub struct AppState {
    pub config: Config,
    pub authority_account: AccountId,
    pub ledger: Arc<MarketLedger<MemoryAuthority>>,
    pub resolver: Arc<EndpointResolver<HttpProbe>>,
    pub content: ContentResolver<HttpProbe, HttpFetch>,
    pub ledger_feed: LedgerAccessClient<HttpProbe, HttpFetch>,
    pub snapshot: RwLock<Snapshot>,
    pub start_time: Instant,
    pub request_count: AtomicU64,
    pub executes_in_flight: AtomicU64,
    pub ready: AtomicBool,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, Error> {
        let authority_account: AccountId = config
            .authority_account
            .parse()
            .map_err(|e| Error::Config(format!("invalid authority account: {e}")))?;
        if config.ledger_endpoints.is_empty() {
            return Err(Error::Config("no ledger endpoints configured".to_string()));
        }
        if config.content_gateways.is_empty() {
            return Err(Error::Config("no content gateways configured".to_string()));
        }
        if config.refresh_interval_ms == 0 {
            return Err(Error::Config(
                "refresh_interval_ms must be positive".to_string(),
            ));
        }

        // Endpoint lists are normalized once so config values, cache keys,
        // and failure reports all compare equal.
        let ledger_endpoints = normalize(&config.ledger_endpoints);
        let content_gateways = normalize(&config.content_gateways);

        let client = reqwest::Client::new();
        let resolver = Arc::new(EndpointResolver::new(
            HttpProbe::new(client.clone()),
            ledger_endpoints.clone(),
            content_gateways.clone(),
            Duration::from_millis(config.probe_timeout_ms),
        ));
        let content = ContentResolver::new(
            resolver.clone(),
            HttpFetch::new(client.clone()),
            content_gateways.clone(),
            Duration::from_millis(config.json_timeout_ms),
            Duration::from_millis(config.binary_timeout_ms),
            config.fetch_deadline_ms,
        );
        let ledger_feed = LedgerAccessClient::new(
            resolver.clone(),
            HttpFetch::new(client),
            Duration::from_millis(config.json_timeout_ms),
        );
        let ledger = Arc::new(MarketLedger::new(
            MemoryAuthority::new(),
            Arc::new(SystemClock),
        ));

        info!(
            authority = %authority_account,
            ledger_endpoints = ledger_endpoints.len(),
            content_gateways = content_gateways.len(),
            "Gateway state initialized"
        );

        Ok(Self {
            config,
            authority_account,
            ledger,
            resolver,
            content,
            ledger_feed,
            snapshot: RwLock::new(Snapshot::default()),
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            executes_in_flight: AtomicU64::new(0),
            ready: AtomicBool::new(false),
        })
    }
}

fn normalize(endpoints: &[String]) -> Vec<String> {
    endpoints
        .iter()
        .map(|e| e.trim_end_matches('/').to_string())
        .filter(|e| !e.is_empty())
        .collect()
}
