//! Collection registry view.
//!
//! Rebuilt from the event log rather than served from live state, so any
//! reader holding a recent window of records can answer collection queries
//! without touching the ledger lock. Collections whose create event has
//! fallen out of the window are invisible to this view.

use std::collections::BTreeSet;

use mintbay_types::{AccountId, CollectionId, EventRecord, LedgerEvent, SeqNo};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub id: CollectionId,
    pub name: String,
    pub symbol: String,
    pub creator: AccountId,
    pub created_seq: SeqNo,
}

/// Replay `CollectionCreated` records into summaries, oldest first. If a
/// window somehow carries duplicate creates for one id, the first wins.
pub fn collection_summaries(records: &[EventRecord]) -> Vec<CollectionSummary> {
    let mut seen: BTreeSet<CollectionId> = BTreeSet::new();
    let mut summaries = Vec::new();
    for record in records {
        let LedgerEvent::CollectionCreated {
            collection,
            name,
            symbol,
            creator,
        } = &record.event
        else {
            continue;
        };
        if !seen.insert(collection.clone()) {
            continue;
        }
        summaries.push(CollectionSummary {
            id: collection.clone(),
            name: name.clone(),
            symbol: symbol.clone(),
            creator: creator.clone(),
            created_seq: record.seq,
        });
    }
    summaries
}
