//! Trading stats derived from event replay.
//!
//! The replay tracks only listings created inside the window. Events that
//! reference a listing outside it are normal at the window edge and are
//! skipped; events that put a tracked listing into an impossible state mean
//! the log itself is corrupt and fail the whole computation.

use std::collections::BTreeMap;

use mintbay_types::{Amount, CollectionId, EventRecord, LedgerEvent, ListingId, TokenId};
use serde::{Deserialize, Serialize};

use crate::errors::MarketError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionTradeStats {
    pub collection: CollectionId,
    pub sales: u64,
    pub volume: Amount,
    pub floor_price: Option<Amount>,
    pub listed: u64,
}

struct TrackedListing {
    token_id: TokenId,
    price: Amount,
    open: bool,
}

pub fn collection_stats(
    records: &[EventRecord],
    collection: &CollectionId,
) -> Result<CollectionTradeStats, MarketError> {
    let mut listings: BTreeMap<ListingId, TrackedListing> = BTreeMap::new();
    let mut active_by_token: BTreeMap<TokenId, ListingId> = BTreeMap::new();
    let mut sales: u64 = 0;
    let mut volume = Amount::ZERO;

    for record in records {
        match &record.event {
            LedgerEvent::ListingCreated {
                listing_id,
                collection: event_collection,
                token_id,
                price,
                ..
            } if event_collection == collection => {
                if listings.contains_key(listing_id) {
                    return Err(MarketError::InvariantViolation(format!(
                        "replay at seq {}: duplicate create for listing {}",
                        record.seq, listing_id.0
                    )));
                }
                if active_by_token.contains_key(token_id) {
                    return Err(MarketError::InvariantViolation(format!(
                        "replay at seq {}: second active listing for token {}",
                        record.seq, token_id
                    )));
                }
                listings.insert(
                    *listing_id,
                    TrackedListing {
                        token_id: token_id.clone(),
                        price: *price,
                        open: true,
                    },
                );
                active_by_token.insert(token_id.clone(), *listing_id);
            }
            LedgerEvent::ListingCancelled { listing_id } => {
                let Some(listing) = listings.get_mut(listing_id) else {
                    continue;
                };
                if !listing.open {
                    return Err(MarketError::InvariantViolation(format!(
                        "replay at seq {}: cancel of closed listing {}",
                        record.seq, listing_id.0
                    )));
                }
                listing.open = false;
                active_by_token.remove(&listing.token_id);
            }
            LedgerEvent::ListingPriceUpdated { listing_id, price } => {
                let Some(listing) = listings.get_mut(listing_id) else {
                    continue;
                };
                if !listing.open {
                    return Err(MarketError::InvariantViolation(format!(
                        "replay at seq {}: price update on closed listing {}",
                        record.seq, listing_id.0
                    )));
                }
                listing.price = *price;
            }
            LedgerEvent::Sale {
                listing_id,
                collection: event_collection,
                price,
                ..
            } if event_collection == collection => {
                sales += 1;
                volume = volume
                    .checked_add(*price)
                    .ok_or_else(|| MarketError::InternalError("Volume overflow".into()))?;
                let Some(id) = listing_id else {
                    continue;
                };
                let Some(listing) = listings.get_mut(id) else {
                    continue;
                };
                if !listing.open {
                    return Err(MarketError::InvariantViolation(format!(
                        "replay at seq {}: sale of closed listing {}",
                        record.seq, id.0
                    )));
                }
                listing.open = false;
                active_by_token.remove(&listing.token_id);
            }
            _ => {}
        }
    }

    let open = listings.values().filter(|l| l.open);
    let floor_price = open.clone().map(|l| l.price).min();
    let listed = open.count() as u64;
    Ok(CollectionTradeStats {
        collection: collection.clone(),
        sales,
        volume,
        floor_price,
        listed,
    })
}
