//! Content resolution over gateway candidates.
//!
//! A locator is fetched by walking a candidate list (locator hints first,
//! then the healthy gateway, then the configured list) until one candidate
//! yields content of the requested kind. Fetching is total: when every
//! candidate fails the caller gets a placeholder, never an error.

use std::future::Future;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use serde_json::{json, Value};
use tracing::warn;

use mintbay_types::{parse_data_uri, ContentKind, ContentLocator};

use crate::endpoints::{Endpoint, EndpointKind, EndpointResolver, ProbeTransport};
use crate::metrics::METRICS;

/// 1x1 transparent PNG served when a binary fetch exhausts every candidate.
pub const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0a, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// Raw transport response before classification.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Transport seam for content fetches. Production uses [`HttpFetch`]; tests
/// script responses per URL.
pub trait FetchTransport: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<RawResponse, String>> + Send;
}

/// Resolved content, or the placeholder when every candidate failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Json(Value),
    Binary { bytes: Vec<u8>, content_type: String },
    Fallback(Fallback),
}

impl Fetched {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Fetched::Fallback(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fallback {
    /// Placeholder image for failed binary fetches.
    Image,
    /// Error document for failed JSON fetches.
    Document(Value),
}

enum Classified {
    Json(Value),
    Binary { bytes: Vec<u8>, content_type: String },
    Unrecognized(String),
}

impl Classified {
    fn label(&self) -> &'static str {
        match self {
            Classified::Json(_) => "json",
            Classified::Binary { .. } => "binary",
            Classified::Unrecognized(_) => "unrecognized",
        }
    }
}

/// Classify a 2xx response by its content type. JSON types must parse to
/// count as JSON; anything else with a content type is binary.
fn classify(response: RawResponse) -> Classified {
    let base_type = response
        .content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    if base_type.is_empty() {
        return Classified::Unrecognized(response.content_type);
    }
    let is_json = base_type == "application/json"
        || base_type == "text/json"
        || base_type.ends_with("+json");
    if is_json {
        match serde_json::from_slice::<Value>(&response.body) {
            Ok(value) => Classified::Json(value),
            Err(_) => Classified::Unrecognized(response.content_type),
        }
    } else {
        Classified::Binary {
            bytes: response.body,
            content_type: base_type,
        }
    }
}

struct Candidate {
    url: String,
    /// Gateway base the URL was joined from. `None` for direct URLs, which
    /// have no endpoint to report failures against.
    base: Option<String>,
}

pub struct ContentResolver<P: ProbeTransport, F: FetchTransport> {
    resolver: Arc<EndpointResolver<P>>,
    transport: F,
    gateways: Vec<String>,
    json_timeout: Duration,
    binary_timeout: Duration,
    deadline_ms: u64,
}

impl<P: ProbeTransport, F: FetchTransport> ContentResolver<P, F> {
    pub fn new(
        resolver: Arc<EndpointResolver<P>>,
        transport: F,
        gateways: Vec<String>,
        json_timeout: Duration,
        binary_timeout: Duration,
        deadline_ms: u64,
    ) -> Self {
        Self {
            resolver,
            transport,
            gateways,
            json_timeout,
            binary_timeout,
            deadline_ms,
        }
    }

    fn attempt_timeout(&self, kind: ContentKind) -> Duration {
        match kind {
            ContentKind::Json => self.json_timeout,
            ContentKind::Binary => self.binary_timeout,
        }
    }

    fn fallback(kind: ContentKind, details: &str) -> Fetched {
        METRICS.fetch_fallback.fetch_add(1, Ordering::Relaxed);
        match kind {
            ContentKind::Binary => Fetched::Fallback(Fallback::Image),
            ContentKind::Json => Fetched::Fallback(Fallback::Document(json!({
                "error": "content unavailable",
                "details": details,
            }))),
        }
    }

    /// Fetch `locator` as `kind`. Total: always returns content or a
    /// placeholder, never an error.
    pub async fn fetch(&self, locator: &ContentLocator, kind: ContentKind) -> Fetched {
        METRICS.fetch_total.fetch_add(1, Ordering::Relaxed);

        if locator.is_inline() {
            return Self::decode_inline(locator, kind);
        }

        let candidates = self.candidates(locator).await;
        if candidates.is_empty() {
            warn!(locator = %locator, "No content candidates configured");
            return Self::fallback(kind, "no content gateways configured");
        }

        let attempt_ms = self.attempt_timeout(kind).as_millis() as u64;
        let deadline_ms = if self.deadline_ms > 0 {
            self.deadline_ms
        } else {
            candidates.len() as u64 * attempt_ms + 2_000
        };
        let walk = self.try_candidates(locator, kind, &candidates);
        match tokio::time::timeout(Duration::from_millis(deadline_ms), walk).await {
            Ok(fetched) => fetched,
            Err(_) => {
                warn!(locator = %locator, deadline_ms, "Content fetch deadline expired");
                Self::fallback(kind, &format!("deadline expired after {deadline_ms} ms"))
            }
        }
    }

    async fn try_candidates(
        &self,
        locator: &ContentLocator,
        kind: ContentKind,
        candidates: &[Candidate],
    ) -> Fetched {
        let attempt_timeout = self.attempt_timeout(kind);
        for candidate in candidates {
            let outcome =
                tokio::time::timeout(attempt_timeout, self.transport.fetch(&candidate.url)).await;
            let response = match outcome {
                Ok(Ok(response)) => response,
                Ok(Err(error)) => {
                    warn!(url = %candidate.url, %error, "Content fetch failed; advancing");
                    self.report(candidate).await;
                    continue;
                }
                Err(_) => {
                    warn!(
                        url = %candidate.url,
                        timeout_ms = attempt_timeout.as_millis() as u64,
                        "Content fetch timed out; advancing"
                    );
                    self.report(candidate).await;
                    continue;
                }
            };

            // Rate limiting is not an endpoint fault; advance without evicting.
            if response.status == 429 {
                METRICS.fetch_rate_limited.fetch_add(1, Ordering::Relaxed);
                warn!(url = %candidate.url, "Rate limited; advancing");
                continue;
            }
            if !(200..300).contains(&response.status) {
                warn!(
                    url = %candidate.url,
                    status = response.status,
                    "Content fetch failed; advancing"
                );
                self.report(candidate).await;
                continue;
            }

            match (kind, classify(response)) {
                (ContentKind::Json, Classified::Json(value)) => return Fetched::Json(value),
                (
                    ContentKind::Binary,
                    Classified::Binary {
                        bytes,
                        content_type,
                    },
                ) => {
                    return Fetched::Binary {
                        bytes,
                        content_type,
                    }
                }
                (_, other) => {
                    warn!(
                        url = %candidate.url,
                        expected = kind.as_str(),
                        got = other.label(),
                        "Content classification mismatch; advancing"
                    );
                }
            }
        }

        warn!(
            locator = %locator,
            candidates = candidates.len(),
            "All content candidates failed"
        );
        Self::fallback(
            kind,
            &format!("all {} candidates failed for {locator}", candidates.len()),
        )
    }

    /// Build the candidate URL list: direct URLs stand alone; everything
    /// else is joined against hint gateways, then the healthy gateway, then
    /// the configured list, deduplicated.
    async fn candidates(&self, locator: &ContentLocator) -> Vec<Candidate> {
        if locator.id.starts_with("http://") || locator.id.starts_with("https://") {
            return vec![Candidate {
                url: locator.id.clone(),
                base: None,
            }];
        }

        let mut bases: Vec<String> = Vec::new();
        for hint in &locator.hints {
            push_unique(&mut bases, hint);
        }
        if let Ok(endpoint) = self.resolver.resolve(EndpointKind::ContentGateway).await {
            push_unique(&mut bases, &endpoint.0);
        }
        for gateway in &self.gateways {
            push_unique(&mut bases, gateway);
        }

        bases
            .into_iter()
            .map(|base| Candidate {
                url: format!("{}/{}", base, locator.id),
                base: Some(base),
            })
            .collect()
    }

    async fn report(&self, candidate: &Candidate) {
        if let Some(base) = &candidate.base {
            self.resolver
                .report_failure(EndpointKind::ContentGateway, &Endpoint(base.clone()))
                .await;
        }
    }

    fn decode_inline(locator: &ContentLocator, kind: ContentKind) -> Fetched {
        let Some((meta, payload)) = parse_data_uri(&locator.id) else {
            warn!(locator = %locator, "Malformed data locator");
            return Self::fallback(kind, "malformed data locator");
        };
        let (media_type, is_base64) = match meta.strip_suffix(";base64") {
            Some(media_type) => (media_type, true),
            None => (meta, false),
        };
        let body = if is_base64 {
            match B64.decode(payload) {
                Ok(bytes) => bytes,
                Err(error) => {
                    warn!(locator = %locator, %error, "Inline payload is not valid base64");
                    return Self::fallback(kind, "inline payload is not valid base64");
                }
            }
        } else {
            payload.as_bytes().to_vec()
        };
        let content_type = if media_type.is_empty() {
            "text/plain".to_string()
        } else {
            media_type.to_string()
        };
        let response = RawResponse {
            status: 200,
            content_type,
            body,
        };
        match (kind, classify(response)) {
            (ContentKind::Json, Classified::Json(value)) => Fetched::Json(value),
            (
                ContentKind::Binary,
                Classified::Binary {
                    bytes,
                    content_type,
                },
            ) => Fetched::Binary {
                bytes,
                content_type,
            },
            (_, other) => Self::fallback(
                kind,
                &format!("inline payload is {}, not {kind}", other.label()),
            ),
        }
    }
}

fn push_unique(bases: &mut Vec<String>, base: &str) {
    let normalized = base.trim_end_matches('/').to_string();
    if !normalized.is_empty() && !bases.contains(&normalized) {
        bases.push(normalized);
    }
}

/// Fetches content over HTTP via the shared client.
pub struct HttpFetch {
    client: reqwest::Client,
}

impl HttpFetch {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl FetchTransport for HttpFetch {
    async fn fetch(&self, url: &str) -> Result<RawResponse, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = response.bytes().await.map_err(|e| e.to_string())?.to_vec();
        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}
