//! # Mintbay Gateway
//!
//! HTTP front door for the Mintbay protocol. Actions settle against the
//! in-process marketplace ledger; reads come from a periodically published
//! registry snapshot; collection content is resolved across gateway
//! candidates with placeholder fallbacks.
//!
//! ## Quick Start
//! ```bash
//! cargo run --bin gateway
//! ```
//!
//! ## Endpoints
//! - `GET /health` - Health check with ledger and feed status
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics
//! - `GET /collections` - Registry snapshot
//! - `GET /collections/{id}` - Full collection record
//! - `GET /collections/{id}/stats` - Trade stats
//! - `GET /content/{locator}?kind=` - Resolve collection content
//! - `GET /ledger/head` - Event log head
//! - `GET /ledger/events?from=&to=` - Event log range
//! - `POST /execute` - Dispatch a marketplace action

pub mod config;
pub mod content;
pub mod endpoints;
mod error;
mod handlers;
pub mod jobs;
pub mod ledger_client;
pub mod metrics;
mod middleware;
mod response;
mod router;
mod schemas;
pub mod state;

pub use config::Config;
pub use error::Error;
pub use router::create as create_router;
pub use state::AppState;
