//! Error types for the gateway.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mintbay_market::MarketError;
use std::fmt;

/// Gateway error type.
#[derive(Debug)]
pub enum Error {
    /// Configuration error.
    Config(String),
    /// Every candidate endpoint for a backend kind failed to probe.
    Resolve(String),
    /// A remote ledger feed answered with something unusable.
    Feed(String),
    /// Marketplace operation failure, mapped per class.
    Market(MarketError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Resolve(msg) => write!(f, "resolve error: {msg}"),
            Error::Feed(msg) => write!(f, "feed error: {msg}"),
            Error::Market(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<MarketError> for Error {
    fn from(err: MarketError) -> Self {
        Error::Market(err)
    }
}

impl From<crate::endpoints::ResolveError> for Error {
    fn from(err: crate::endpoints::ResolveError) -> Self {
        Error::Resolve(err.to_string())
    }
}

impl Error {
    /// HTTP status this error surfaces as.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Resolve(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Feed(_) => StatusCode::BAD_GATEWAY,
            Error::Market(err) => match err {
                MarketError::Unauthorized(_) => StatusCode::FORBIDDEN,
                MarketError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                MarketError::NotFound(_) => StatusCode::NOT_FOUND,
                MarketError::StateConflict(_) | MarketError::MintRejected(_) => {
                    StatusCode::CONFLICT
                }
                MarketError::InsufficientFunds(_) => StatusCode::PAYMENT_REQUIRED,
                MarketError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                MarketError::InvariantViolation(_) | MarketError::InternalError(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string()
        });
        (status, Json(body)).into_response()
    }
}
