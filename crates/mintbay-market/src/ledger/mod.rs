//! The marketplace ledger: collections, listings, offers, sales, and the
//! append-only event log they emit into.
//!
//! Locking discipline: every mutating operation takes the write lock once
//! for its validate-and-claim step, which is the linearization point, and
//! never holds it across an await. Authority settlement runs between lock
//! sections; failures roll the claim back.

mod buy;
mod collections;
mod listing;
mod mint;
mod offers;
mod types;

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use mintbay_types::{
    AccountId, CollectionId, EventRecord, LedgerEvent, ListingId, SeqNo, TokenId,
};

use crate::authority::LedgerAuthority;
use crate::clock::Clock;
use crate::constants::{DEFAULT_OFFERS_PAGE, MAX_OFFERS_PAGE};
use crate::errors::MarketError;

pub use types::{
    AllowlistConfig, AllowlistStage, Collection, CollectionConfig, Listing, MintReceipt, Offer,
    Sale, SaleReference,
};

#[derive(Default)]
pub(crate) struct LedgerState {
    pub(crate) collections: BTreeMap<CollectionId, Collection>,
    // One counter per (collection, wallet), shared across stages.
    pub(crate) mint_counts: BTreeMap<(CollectionId, AccountId), u32>,
    pub(crate) listings: BTreeMap<ListingId, Listing>,
    // Latest listing per token; the active-uniqueness check goes through it.
    pub(crate) token_listing: BTreeMap<TokenId, ListingId>,
    pub(crate) offers: BTreeMap<(TokenId, AccountId), Offer>,
    pub(crate) sales: Vec<Sale>,
    pub(crate) next_listing_id: u64,
    pub(crate) log: Vec<EventRecord>,
}

impl LedgerState {
    pub(crate) fn emit(&mut self, at: u64, event: LedgerEvent) -> SeqNo {
        let seq = self.log.len() as u64 + 1;
        self.log.push(EventRecord { seq, at, event });
        seq
    }

    pub(crate) fn active_listing_id(&self, token: &TokenId) -> Option<ListingId> {
        let id = self.token_listing.get(token)?;
        self.listings.get(id).filter(|l| l.active).map(|l| l.id)
    }

    pub(crate) fn collection_or_not_found(
        &self,
        id: &CollectionId,
    ) -> Result<&Collection, MarketError> {
        self.collections
            .get(id)
            .ok_or_else(MarketError::collection_not_found)
    }
}

pub struct MarketLedger<A> {
    authority: A,
    clock: Arc<dyn Clock>,
    state: RwLock<LedgerState>,
}

impl<A: LedgerAuthority> MarketLedger<A> {
    pub fn new(authority: A, clock: Arc<dyn Clock>) -> Self {
        Self {
            authority,
            clock,
            state: RwLock::new(LedgerState::default()),
        }
    }

    pub fn authority(&self) -> &A {
        &self.authority
    }

    pub(crate) fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    // --- Views ---

    pub fn collection(&self, id: &CollectionId) -> Option<Collection> {
        self.read().collections.get(id).cloned()
    }

    pub fn collections(&self) -> Vec<Collection> {
        self.read().collections.values().cloned().collect()
    }

    pub fn listing(&self, id: ListingId) -> Option<Listing> {
        self.read().listings.get(&id).cloned()
    }

    /// Active listing for a token, if any.
    pub fn listing_for_token(&self, token: &TokenId) -> Option<Listing> {
        let state = self.read();
        let id = state.active_listing_id(token)?;
        state.listings.get(&id).cloned()
    }

    pub fn offer(&self, token: &TokenId, buyer: &AccountId) -> Option<Offer> {
        self.read().offers.get(&(token.clone(), buyer.clone())).cloned()
    }

    /// Offers on a token in buyer order, paginated.
    pub fn offers_for_token(
        &self,
        token: &TokenId,
        from_index: Option<u64>,
        limit: Option<u64>,
    ) -> Vec<Offer> {
        let start = from_index.unwrap_or(0) as usize;
        let limit = limit
            .map(|l| l as usize)
            .unwrap_or(DEFAULT_OFFERS_PAGE)
            .min(MAX_OFFERS_PAGE);
        self.read()
            .offers
            .iter()
            .filter(|((t, _), _)| t == token)
            .skip(start)
            .take(limit)
            .map(|(_, offer)| offer.clone())
            .collect()
    }

    pub fn sales(&self, limit: usize) -> Vec<Sale> {
        let state = self.read();
        let skip = state.sales.len().saturating_sub(limit);
        state.sales[skip..].to_vec()
    }

    /// The requester's persisted mint counter for a collection.
    pub fn minted_by(&self, collection: &CollectionId, wallet: &AccountId) -> u32 {
        self.read()
            .mint_counts
            .get(&(collection.clone(), wallet.clone()))
            .copied()
            .unwrap_or(0)
    }

    // --- Event log reads ---

    pub fn head_seq(&self) -> SeqNo {
        self.read().log.len() as u64
    }

    /// Log entries with `from <= seq <= to`, clamped to the log bounds.
    pub fn events_in(&self, from: SeqNo, to: SeqNo) -> Vec<EventRecord> {
        let state = self.read();
        let head = state.log.len() as u64;
        if head == 0 || from > to || from > head {
            return Vec::new();
        }
        let lo = from.max(1) as usize - 1;
        let hi = to.min(head) as usize;
        state.log[lo..hi].to_vec()
    }

    /// The most recent `window` entries.
    pub fn recent_events(&self, window: u64) -> Vec<EventRecord> {
        let head = self.head_seq();
        let from = head.saturating_sub(window) + 1;
        self.events_in(from, head)
    }
}
