/// Parse failure for protocol identifiers and amounts.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    InvalidAccount(String),
    InvalidCollection(String),
    InvalidToken(String),
    InvalidAmount(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAccount(s) => write!(f, "invalid account id: {s}"),
            Self::InvalidCollection(s) => write!(f, "invalid collection id: {s}"),
            Self::InvalidToken(s) => write!(f, "invalid token id: {s}"),
            Self::InvalidAmount(s) => write!(f, "invalid amount: {s}"),
        }
    }
}

impl std::error::Error for ParseError {}
