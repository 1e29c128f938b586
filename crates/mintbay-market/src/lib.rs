//! Marketplace ledger, mint eligibility engine, and event read-models for
//! the Mintbay protocol.

pub mod constants;
mod errors;

mod authority;
mod clock;
mod eligibility;

mod dispatch;
mod ledger;
mod registry;
mod stats;

#[cfg(test)]
mod tests;

pub use authority::{AuthorityError, AuthorityOp, LedgerAuthority, MemoryAuthority};
pub use clock::{Clock, ManualClock, SystemClock};
pub use constants::*;
pub use dispatch::Action;
pub use eligibility::{MintQuote, MintReject, StageKind, evaluate_mint};
pub use errors::MarketError;
pub use ledger::{
    AllowlistConfig, AllowlistStage, Collection, CollectionConfig, Listing, MarketLedger,
    MintReceipt, Offer, Sale, SaleReference,
};
pub use registry::{CollectionSummary, collection_summaries};
pub use stats::{CollectionTradeStats, collection_stats};
