//! HTTP request handlers.

use crate::content::{Fallback, Fetched, PLACEHOLDER_PNG};
use crate::error::Error;
use crate::metrics::METRICS;
use crate::middleware::RequestId;
use crate::response::{EventsResponse, ExecuteResponse, HeadResponse, HealthResponse};
use crate::schemas::{ContentQuery, EventRangeQuery, ExecuteRequest};
use crate::state::AppState;
use axum::extract::{FromRequest, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mintbay_market::{Collection, CollectionSummary, CollectionTradeStats, MarketError};
use mintbay_types::{CollectionId, ContentLocator};
use serde_json::Value;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Readiness probe. Returns 200 once the first snapshot pass has published.
pub async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Prometheus metrics in text exposition format.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let collections = state.snapshot.read().await.collections.len();
    let body = METRICS.render(
        state.ledger.head_seq(),
        collections,
        state.executes_in_flight.load(Ordering::Relaxed),
    );
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        body,
    )
}

/// Health check with ledger, snapshot, and remote feed status.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let feed_status = match state.ledger_feed.head_seq().await {
        Ok(_) => "ok",
        Err(_) => "unavailable",
    };

    let status = if !state.ready.load(Ordering::Relaxed) {
        "starting"
    } else if feed_status != "ok" {
        "degraded"
    } else {
        "ok"
    };

    let collections = state.snapshot.read().await.collections.len();
    Json(HealthResponse {
        status,
        authority_account: state.authority_account.to_string(),
        ledger_head: state.ledger.head_seq(),
        collections,
        uptime_secs: state.start_time.elapsed().as_secs(),
        requests: state.request_count.load(Ordering::Relaxed),
        feed_status,
        endpoint_failovers: METRICS.endpoint_failovers.load(Ordering::Relaxed),
    })
}

/// Registry view from the published snapshot.
pub async fn collections(State(state): State<Arc<AppState>>) -> Json<Vec<CollectionSummary>> {
    Json(state.snapshot.read().await.collections.clone())
}

/// Full collection record, straight from the ledger.
pub async fn collection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Collection>, Error> {
    let id: CollectionId = id.parse().map_err(|_| {
        Error::Market(MarketError::InvalidInput(format!(
            "Invalid collection id: {id}"
        )))
    })?;
    let collection = state
        .ledger
        .collection(&id)
        .ok_or_else(|| Error::Market(MarketError::collection_not_found()))?;
    Ok(Json(collection))
}

/// Trade stats from the snapshot, falling back to a live replay for
/// collections created since the last refresh pass.
pub async fn collection_stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CollectionTradeStats>, Error> {
    let id: CollectionId = id.parse().map_err(|_| {
        Error::Market(MarketError::InvalidInput(format!(
            "Invalid collection id: {id}"
        )))
    })?;

    if let Some(stats) = state.snapshot.read().await.stats.get(&id) {
        return Ok(Json(stats.clone()));
    }

    if state.ledger.collection(&id).is_none() {
        return Err(Error::Market(MarketError::collection_not_found()));
    }
    let events = state.ledger.recent_events(state.config.stats_scan_window);
    let stats = mintbay_market::collection_stats(&events, &id).map_err(Error::Market)?;
    Ok(Json(stats))
}

/// Resolve a content locator and stream it back as the requested kind.
/// Total: failures come back as a placeholder, never an error status.
pub async fn content(
    State(state): State<Arc<AppState>>,
    Path(locator): Path<String>,
    Query(query): Query<ContentQuery>,
) -> Response {
    let locator = ContentLocator::new(locator);
    match state.content.fetch(&locator, query.kind).await {
        Fetched::Json(value) => Json(value).into_response(),
        Fetched::Binary {
            bytes,
            content_type,
        } => ([(axum::http::header::CONTENT_TYPE, content_type)], bytes).into_response(),
        Fetched::Fallback(Fallback::Image) => (
            [(axum::http::header::CONTENT_TYPE, "image/png")],
            PLACEHOLDER_PNG.to_vec(),
        )
            .into_response(),
        Fetched::Fallback(Fallback::Document(value)) => Json(value).into_response(),
    }
}

/// Head of the event log, for remote readers.
pub async fn ledger_head(State(state): State<Arc<AppState>>) -> Json<HeadResponse> {
    Json(HeadResponse {
        head: state.ledger.head_seq(),
    })
}

/// Inclusive event range, for remote readers. Out-of-range bounds clamp to
/// the log.
pub async fn ledger_events(
    State(state): State<Arc<AppState>>,
    Query(range): Query<EventRangeQuery>,
) -> Json<EventsResponse> {
    let head = state.ledger.head_seq();
    let from = range.from.unwrap_or(1);
    let to = range.to.unwrap_or(head);
    Json(EventsResponse {
        events: state.ledger.events_in(from, to),
    })
}

/// Dispatch one marketplace action against the ledger.
pub async fn execute(
    State(state): State<Arc<AppState>>,
    request_parts: axum::extract::Request,
) -> (StatusCode, Json<ExecuteResponse>) {
    let start = std::time::Instant::now();
    METRICS.execute_total.fetch_add(1, Ordering::Relaxed);
    state.request_count.fetch_add(1, Ordering::Relaxed);

    // Extract correlation ID (set by middleware).
    let req_id = request_parts
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_default();

    // Parse JSON body
    let request: Value = match Json::<Value>::from_request(request_parts, &state).await {
        Ok(Json(v)) => v,
        Err(e) => {
            METRICS.execute_error.fetch_add(1, Ordering::Relaxed);
            warn!(req_id = %req_id, error = %e, "Invalid JSON body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ExecuteResponse::err("Invalid JSON body")),
            );
        }
    };

    let action_type = request
        .get("action")
        .and_then(|a| a.get("type"))
        .and_then(|t| t.as_str())
        .unwrap_or("unknown")
        .to_string();

    let request: ExecuteRequest = match serde_json::from_value(request) {
        Ok(r) => r,
        Err(e) => {
            METRICS.execute_error.fetch_add(1, Ordering::Relaxed);
            warn!(req_id = %req_id, action = %action_type, error = %e, "Malformed execute request");
            return (
                StatusCode::BAD_REQUEST,
                Json(ExecuteResponse::err(format!(
                    "Malformed execute request: {e}"
                ))),
            );
        }
    };

    info!(req_id = %req_id, actor = %request.actor, action = %action_type, "Dispatching action");

    // Settle on a spawned task so a dropped connection cannot cancel a
    // half-applied action.
    state.executes_in_flight.fetch_add(1, Ordering::Relaxed);
    let task_state = state.clone();
    let task = tokio::spawn(async move {
        let result = task_state
            .ledger
            .execute(&request.actor, request.action)
            .await;
        task_state.executes_in_flight.fetch_sub(1, Ordering::Relaxed);
        result
    });

    match task.await {
        Ok(Ok(result)) => {
            METRICS.execute_success.fetch_add(1, Ordering::Relaxed);
            METRICS.record_execute_duration(start);
            info!(req_id = %req_id, action = %action_type, "Action settled");
            (StatusCode::OK, Json(ExecuteResponse::ok(result)))
        }
        Ok(Err(e)) => {
            METRICS.execute_error.fetch_add(1, Ordering::Relaxed);
            METRICS.record_execute_duration(start);
            warn!(req_id = %req_id, action = %action_type, error = %e, "Action rejected");
            let error = Error::Market(e);
            (error.status(), Json(ExecuteResponse::err(error.to_string())))
        }
        Err(e) => {
            // The settlement task panicked; its decrement never ran.
            state.executes_in_flight.fetch_sub(1, Ordering::Relaxed);
            METRICS.execute_error.fetch_add(1, Ordering::Relaxed);
            error!(req_id = %req_id, error = %e, "Execute task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ExecuteResponse::err("Execute task failed")),
            )
        }
    }
}
