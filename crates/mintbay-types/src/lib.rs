//! Shared types and pure-logic utilities for the Mintbay protocol.
//! Zero service dependencies, usable by the market core and the gateway.

mod amount;
mod content;
mod error;
mod events;
mod ids;

pub use amount::Amount;
pub use content::{ContentKind, ContentLocator, parse_data_uri};
pub use error::ParseError;
pub use events::{EventRecord, LedgerEvent, SeqNo};
pub use ids::{AccountId, CollectionId, ListingId, TokenId};
