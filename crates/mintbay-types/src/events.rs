//! Ledger event payloads. The marketplace appends these to its log; the
//! registry and the stats aggregator replay them, and the gateway serves
//! them to remote readers as JSON.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::ids::{AccountId, CollectionId, ListingId, TokenId};

/// Position in the append-only event log, starting at 1.
pub type SeqNo = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    CollectionCreated {
        collection: CollectionId,
        name: String,
        symbol: String,
        creator: AccountId,
    },
    Minted {
        collection: CollectionId,
        receiver: AccountId,
        quantity: u32,
        total_paid: Amount,
    },
    ListingCreated {
        listing_id: ListingId,
        seller: AccountId,
        collection: CollectionId,
        token_id: TokenId,
        price: Amount,
    },
    ListingCancelled {
        listing_id: ListingId,
    },
    ListingPriceUpdated {
        listing_id: ListingId,
        price: Amount,
    },
    // Sales through an offer carry no listing id.
    Sale {
        listing_id: Option<ListingId>,
        buyer: AccountId,
        seller: AccountId,
        collection: CollectionId,
        token_id: TokenId,
        price: Amount,
    },
    OfferMade {
        collection: CollectionId,
        token_id: TokenId,
        buyer: AccountId,
        amount: Amount,
    },
    OfferCancelled {
        collection: CollectionId,
        token_id: TokenId,
        buyer: AccountId,
    },
}

impl LedgerEvent {
    /// Stable label for logs and counters.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CollectionCreated { .. } => "collection_created",
            Self::Minted { .. } => "minted",
            Self::ListingCreated { .. } => "listing_created",
            Self::ListingCancelled { .. } => "listing_cancelled",
            Self::ListingPriceUpdated { .. } => "listing_price_updated",
            Self::Sale { .. } => "sale",
            Self::OfferMade { .. } => "offer_made",
            Self::OfferCancelled { .. } => "offer_cancelled",
        }
    }
}

/// A log entry: the payload plus its sequence position and emit time
/// (milliseconds since the Unix epoch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: SeqNo,
    pub at: u64,
    #[serde(flatten)]
    pub event: LedgerEvent,
}
