//! Client for a remote ledger feed.
//!
//! Peer gateways and tooling read the event log over HTTP instead of holding
//! the ledger in-process. Requests go through the endpoint resolver and retry
//! by advancing, bounded by the number of configured endpoints.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use mintbay_types::{EventRecord, SeqNo};

use crate::content::FetchTransport;
use crate::endpoints::{EndpointKind, EndpointResolver, ProbeTransport};
use crate::error::Error;
use crate::response::{EventsResponse, HeadResponse};

pub struct LedgerAccessClient<P: ProbeTransport, F: FetchTransport> {
    resolver: Arc<EndpointResolver<P>>,
    transport: F,
    attempt_timeout: Duration,
}

impl<P: ProbeTransport, F: FetchTransport> LedgerAccessClient<P, F> {
    pub fn new(
        resolver: Arc<EndpointResolver<P>>,
        transport: F,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            transport,
            attempt_timeout,
        }
    }

    /// Current head sequence of the remote log.
    pub async fn head_seq(&self) -> Result<SeqNo, Error> {
        let value = self.get_json("ledger/head").await?;
        let head: HeadResponse = serde_json::from_value(value)
            .map_err(|e| Error::Feed(format!("malformed head response: {e}")))?;
        Ok(head.head)
    }

    /// Events in the inclusive range `from..=to`.
    pub async fn events_in(&self, from: SeqNo, to: SeqNo) -> Result<Vec<EventRecord>, Error> {
        let value = self
            .get_json(&format!("ledger/events?from={from}&to={to}"))
            .await?;
        let events: EventsResponse = serde_json::from_value(value)
            .map_err(|e| Error::Feed(format!("malformed events response: {e}")))?;
        Ok(events.events)
    }

    /// The last `window` events of the remote log.
    pub async fn recent_events(&self, window: u64) -> Result<Vec<EventRecord>, Error> {
        let head = self.head_seq().await?;
        if head == 0 || window == 0 {
            return Ok(Vec::new());
        }
        let from = head.saturating_sub(window) + 1;
        self.events_in(from, head).await
    }

    /// Fetch `path` from the resolved ledger endpoint, failing over to the
    /// next endpoint on transport errors, timeouts, and bad statuses. The
    /// walk is bounded by the configured endpoint count.
    async fn get_json(&self, path: &str) -> Result<Value, Error> {
        let attempts = self.resolver.candidate_count(EndpointKind::Ledger).max(1);
        let mut last_error = String::new();

        for _ in 0..attempts {
            let endpoint = self
                .resolver
                .resolve(EndpointKind::Ledger)
                .await
                .map_err(|e| Error::Resolve(e.to_string()))?;
            let url = format!("{}/{path}", endpoint.0.trim_end_matches('/'));

            let outcome =
                tokio::time::timeout(self.attempt_timeout, self.transport.fetch(&url)).await;
            last_error = match outcome {
                Ok(Ok(response)) if (200..300).contains(&response.status) => {
                    match serde_json::from_slice(&response.body) {
                        Ok(value) => return Ok(value),
                        Err(e) => format!("unparseable feed response: {e}"),
                    }
                }
                Ok(Ok(response)) => format!("status {}", response.status),
                Ok(Err(error)) => error,
                Err(_) => format!("timed out after {} ms", self.attempt_timeout.as_millis()),
            };

            warn!(%url, error = %last_error, "Ledger feed request failed; advancing");
            self.resolver
                .report_failure(EndpointKind::Ledger, &endpoint)
                .await;
        }

        Err(Error::Feed(format!("ledger feed exhausted: {last_error}")))
    }
}
