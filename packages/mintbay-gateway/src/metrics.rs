//! Prometheus metrics (lock-free atomics, zero allocation on hot path).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Traffic ---
    pub requests_total: AtomicU64,
    pub execute_total: AtomicU64,
    pub execute_success: AtomicU64,
    pub execute_error: AtomicU64,

    // --- Latency (μs, updated via CAS) ---
    pub execute_duration_us_sum: AtomicU64,
    pub execute_duration_us_max: AtomicU64,

    // --- Content ---
    pub fetch_total: AtomicU64,
    pub fetch_fallback: AtomicU64,
    pub fetch_rate_limited: AtomicU64,

    // --- Endpoints ---
    pub probes_total: AtomicU64,
    pub probe_failures: AtomicU64,
    pub endpoint_failovers: AtomicU64,

    // --- Snapshots ---
    pub refresh_total: AtomicU64,
    pub refresh_errors: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            execute_total: AtomicU64::new(0),
            execute_success: AtomicU64::new(0),
            execute_error: AtomicU64::new(0),
            execute_duration_us_sum: AtomicU64::new(0),
            execute_duration_us_max: AtomicU64::new(0),
            fetch_total: AtomicU64::new(0),
            fetch_fallback: AtomicU64::new(0),
            fetch_rate_limited: AtomicU64::new(0),
            probes_total: AtomicU64::new(0),
            probe_failures: AtomicU64::new(0),
            endpoint_failovers: AtomicU64::new(0),
            refresh_total: AtomicU64::new(0),
            refresh_errors: AtomicU64::new(0),
        }
    }

    pub fn record_execute_duration(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.execute_duration_us_sum.fetch_add(us, Ordering::Relaxed);
        // CAS loop for max tracking
        let mut cur = self.execute_duration_us_max.load(Ordering::Relaxed);
        while us > cur {
            match self.execute_duration_us_max.compare_exchange_weak(
                cur,
                us,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, ledger_head: u64, collections: usize, executes_in_flight: u64) -> String {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let execute_total = self.execute_total.load(Ordering::Relaxed);
        let execute_success = self.execute_success.load(Ordering::Relaxed);
        let execute_error = self.execute_error.load(Ordering::Relaxed);
        let exec_dur_sum = self.execute_duration_us_sum.load(Ordering::Relaxed);
        let exec_dur_max = self.execute_duration_us_max.swap(0, Ordering::Relaxed);
        let fetch_total = self.fetch_total.load(Ordering::Relaxed);
        let fetch_fallback = self.fetch_fallback.load(Ordering::Relaxed);
        let fetch_rate_limited = self.fetch_rate_limited.load(Ordering::Relaxed);
        let probes_total = self.probes_total.load(Ordering::Relaxed);
        let probe_failures = self.probe_failures.load(Ordering::Relaxed);
        let endpoint_failovers = self.endpoint_failovers.load(Ordering::Relaxed);
        let refresh_total = self.refresh_total.load(Ordering::Relaxed);
        let refresh_errors = self.refresh_errors.load(Ordering::Relaxed);

        // Convert μs to seconds for Prometheus conventions
        let exec_dur_sum_s = exec_dur_sum as f64 / 1_000_000.0;
        let exec_dur_max_s = exec_dur_max as f64 / 1_000_000.0;

        format!(
            "\
# HELP gateway_requests_total Total HTTP requests received.\n\
# TYPE gateway_requests_total counter\n\
gateway_requests_total {requests}\n\
# HELP gateway_execute_total Execute requests received.\n\
# TYPE gateway_execute_total counter\n\
gateway_execute_total {execute_total}\n\
# HELP gateway_execute_success_total Actions settled successfully.\n\
# TYPE gateway_execute_success_total counter\n\
gateway_execute_success_total {execute_success}\n\
# HELP gateway_execute_error_total Actions rejected or failed.\n\
# TYPE gateway_execute_error_total counter\n\
gateway_execute_error_total {execute_error}\n\
# HELP gateway_execute_duration_seconds_sum Total execute handler time (seconds).\n\
# TYPE gateway_execute_duration_seconds_sum counter\n\
gateway_execute_duration_seconds_sum {exec_dur_sum_s:.6}\n\
# HELP gateway_execute_duration_seconds_max Max execute handler time since last scrape (seconds).\n\
# TYPE gateway_execute_duration_seconds_max gauge\n\
gateway_execute_duration_seconds_max {exec_dur_max_s:.6}\n\
# HELP gateway_fetch_total Content fetch requests.\n\
# TYPE gateway_fetch_total counter\n\
gateway_fetch_total {fetch_total}\n\
# HELP gateway_fetch_fallback_total Fetches that exhausted every candidate.\n\
# TYPE gateway_fetch_fallback_total counter\n\
gateway_fetch_fallback_total {fetch_fallback}\n\
# HELP gateway_fetch_rate_limited_total Candidate attempts answered 429.\n\
# TYPE gateway_fetch_rate_limited_total counter\n\
gateway_fetch_rate_limited_total {fetch_rate_limited}\n\
# HELP gateway_probes_total Endpoint health probes issued.\n\
# TYPE gateway_probes_total counter\n\
gateway_probes_total {probes_total}\n\
# HELP gateway_probe_failures_total Endpoint health probes failed.\n\
# TYPE gateway_probe_failures_total counter\n\
gateway_probe_failures_total {probe_failures}\n\
# HELP gateway_endpoint_failovers_total Cached endpoints evicted after failures.\n\
# TYPE gateway_endpoint_failovers_total counter\n\
gateway_endpoint_failovers_total {endpoint_failovers}\n\
# HELP gateway_refresh_total Snapshot refresh passes.\n\
# TYPE gateway_refresh_total counter\n\
gateway_refresh_total {refresh_total}\n\
# HELP gateway_refresh_errors_total Snapshot refresh replay errors.\n\
# TYPE gateway_refresh_errors_total counter\n\
gateway_refresh_errors_total {refresh_errors}\n\
# HELP gateway_ledger_head Current ledger log head sequence.\n\
# TYPE gateway_ledger_head gauge\n\
gateway_ledger_head {ledger_head}\n\
# HELP gateway_collections Collections in the published snapshot.\n\
# TYPE gateway_collections gauge\n\
gateway_collections {collections}\n\
# HELP gateway_executes_in_flight Actions currently settling.\n\
# TYPE gateway_executes_in_flight gauge\n\
gateway_executes_in_flight {executes_in_flight}\n"
        )
    }
}
