use crate::authority::AuthorityError;
use crate::eligibility::MintReject;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum MarketError {
    Unauthorized(String),
    InvalidInput(String),
    NotFound(String),
    StateConflict(String),
    MintRejected(MintReject),
    InsufficientFunds(String),
    Unavailable(String),
    InvariantViolation(String),
    InternalError(String),
}

impl std::fmt::Display for MarketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::StateConflict(msg) => write!(f, "State conflict: {}", msg),
            Self::MintRejected(reject) => write!(f, "Mint rejected: {}", reject),
            Self::InsufficientFunds(msg) => write!(f, "Insufficient funds: {}", msg),
            Self::Unavailable(msg) => write!(f, "Unavailable: {}", msg),
            Self::InvariantViolation(msg) => write!(f, "Invariant violation: {}", msg),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for MarketError {}

impl MarketError {
    pub fn collection_not_found() -> Self {
        Self::NotFound("Collection not found".into())
    }
    pub fn token_not_found() -> Self {
        Self::NotFound("Token not found".into())
    }
    pub fn listing_not_found() -> Self {
        Self::NotFound("No listing found".into())
    }
    pub fn offer_not_found() -> Self {
        Self::NotFound("Offer not found".into())
    }
    pub fn only_owner(what: &str) -> Self {
        Self::Unauthorized(format!("Only {} can perform this action", what))
    }
}

impl From<MintReject> for MarketError {
    fn from(reject: MintReject) -> Self {
        Self::MintRejected(reject)
    }
}

// Default mapping; settlement paths that can distinguish a funds shortfall
// map `Rejected` to `InsufficientFunds` explicitly.
impl From<AuthorityError> for MarketError {
    fn from(err: AuthorityError) -> Self {
        match err {
            AuthorityError::Rejected(msg) => Self::StateConflict(msg),
            AuthorityError::Unavailable(msg) => Self::Unavailable(msg),
        }
    }
}
