//! Endpoint resolution with health probing and failover.
//!
//! Each endpoint kind keeps a fixed priority list of candidates. The first
//! candidate answering a health probe is cached and served until it is
//! invalidated or reported failed, at which point the next resolve walks the
//! list again.

use std::fmt;
use std::future::Future;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::metrics::METRICS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    Ledger,
    ContentGateway,
}

impl EndpointKind {
    pub fn label(&self) -> &'static str {
        match self {
            EndpointKind::Ledger => "ledger",
            EndpointKind::ContentGateway => "content-gateway",
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A resolved base URL for one endpoint kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint(pub String);

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
pub enum ResolveError {
    AllEndpointsUnavailable(EndpointKind),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::AllEndpointsUnavailable(kind) => {
                write!(f, "all {kind} endpoints are unavailable")
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// Transport seam for health probes. Production uses [`HttpProbe`]; tests
/// script responses per URL.
pub trait ProbeTransport: Send + Sync {
    fn probe(&self, url: &str) -> impl Future<Output = Result<(), String>> + Send;
}

// The mutex is held across the whole probe pass so concurrent resolves for
// the same kind wait for one walk and then observe the filled cache.
struct KindCache {
    candidates: Vec<String>,
    cached: Mutex<Option<Endpoint>>,
}

impl KindCache {
    fn new(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            cached: Mutex::new(None),
        }
    }
}

pub struct EndpointResolver<T: ProbeTransport> {
    transport: T,
    probe_timeout: Duration,
    ledger: KindCache,
    content: KindCache,
}

impl<T: ProbeTransport> EndpointResolver<T> {
    pub fn new(
        transport: T,
        ledger_candidates: Vec<String>,
        content_candidates: Vec<String>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            probe_timeout,
            ledger: KindCache::new(ledger_candidates),
            content: KindCache::new(content_candidates),
        }
    }

    fn cache(&self, kind: EndpointKind) -> &KindCache {
        match kind {
            EndpointKind::Ledger => &self.ledger,
            EndpointKind::ContentGateway => &self.content,
        }
    }

    /// Number of configured candidates for a kind. Callers use this to bound
    /// their retry walks.
    pub fn candidate_count(&self, kind: EndpointKind) -> usize {
        self.cache(kind).candidates.len()
    }

    /// Return the cached healthy endpoint for `kind`, probing the candidate
    /// list in priority order if nothing is cached.
    pub async fn resolve(&self, kind: EndpointKind) -> Result<Endpoint, ResolveError> {
        let cache = self.cache(kind);
        let mut cached = cache.cached.lock().await;
        if let Some(endpoint) = cached.as_ref() {
            return Ok(endpoint.clone());
        }

        for candidate in &cache.candidates {
            METRICS.probes_total.fetch_add(1, Ordering::Relaxed);
            let probed =
                tokio::time::timeout(self.probe_timeout, self.transport.probe(candidate)).await;
            match probed {
                Ok(Ok(())) => {
                    info!(kind = kind.label(), endpoint = %candidate, "Endpoint healthy");
                    let endpoint = Endpoint(candidate.clone());
                    *cached = Some(endpoint.clone());
                    return Ok(endpoint);
                }
                Ok(Err(error)) => {
                    METRICS.probe_failures.fetch_add(1, Ordering::Relaxed);
                    warn!(kind = kind.label(), endpoint = %candidate, %error, "Probe failed");
                }
                Err(_) => {
                    METRICS.probe_failures.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        kind = kind.label(),
                        endpoint = %candidate,
                        timeout_ms = self.probe_timeout.as_millis() as u64,
                        "Probe timed out"
                    );
                }
            }
        }

        warn!(kind = kind.label(), "All endpoints failed probing");
        Err(ResolveError::AllEndpointsUnavailable(kind))
    }

    /// Drop the cached endpoint so the next resolve re-probes.
    pub async fn invalidate(&self, kind: EndpointKind) {
        *self.cache(kind).cached.lock().await = None;
    }

    /// Report a failed request against `endpoint`. Evicts it only if it is
    /// the one currently cached; a stale report after failover is a no-op.
    pub async fn report_failure(&self, kind: EndpointKind, endpoint: &Endpoint) {
        let mut cached = self.cache(kind).cached.lock().await;
        if cached.as_ref() == Some(endpoint) {
            METRICS.endpoint_failovers.fetch_add(1, Ordering::Relaxed);
            warn!(kind = kind.label(), endpoint = %endpoint, "Endpoint evicted after failure");
            *cached = None;
        }
    }
}

/// Probes `GET {base}/health` and treats any 2xx as healthy.
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl ProbeTransport for HttpProbe {
    async fn probe(&self, url: &str) -> Result<(), String> {
        let health_url = format!("{}/health", url.trim_end_matches('/'));
        let response = self
            .client
            .get(&health_url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("status {}", response.status().as_u16()))
        }
    }
}
