//! Listing purchases.
//!
//! The listing is claimed (deactivated) under the write lock before any
//! authority call, so concurrent buyers race for the claim rather than the
//! settlement. A failure after the buyer has been charged runs a
//! compensating charge in the opposite direction.

use mintbay_types::{AccountId, Amount, LedgerEvent, ListingId};
use tracing::{error, info, warn};

use crate::authority::{AuthorityError, LedgerAuthority};
use crate::errors::MarketError;
use crate::ledger::types::{Sale, SaleReference};
use crate::ledger::MarketLedger;

impl<A: LedgerAuthority> MarketLedger<A> {
    pub async fn buy(
        &self,
        buyer: &AccountId,
        listing_id: ListingId,
        payment: Amount,
    ) -> Result<Sale, MarketError> {
        let (seller, token, price) = {
            let mut state = self.write();
            let listing = state
                .listings
                .get_mut(&listing_id)
                .ok_or_else(MarketError::listing_not_found)?;
            if !listing.active {
                return Err(MarketError::StateConflict(
                    "Listing is no longer active".into(),
                ));
            }
            if &listing.seller == buyer {
                return Err(MarketError::InvalidInput(
                    "Cannot buy your own listing".into(),
                ));
            }
            if payment != listing.price {
                let msg = format!(
                    "Purchase requires exact payment: required {}, got {}",
                    listing.price, payment
                );
                return Err(if payment < listing.price {
                    MarketError::InsufficientFunds(msg)
                } else {
                    MarketError::InvalidInput(msg)
                });
            }
            listing.active = false;
            (
                listing.seller.clone(),
                listing.token_id.clone(),
                listing.price,
            )
        };

        // The seller may have moved the token since listing it.
        match self.authority().owner_of(&token).await {
            Ok(Some(owner)) if owner == seller => {}
            Ok(_) => {
                let at = self.now_ms();
                let mut state = self.write();
                state.emit(at, LedgerEvent::ListingCancelled { listing_id });
                warn!(listing = listing_id.0, token = %token, "listing stale; cancelled");
                return Err(MarketError::StateConflict(
                    "Token ownership changed — listing is stale".into(),
                ));
            }
            Err(err) => {
                self.reactivate_listing(listing_id);
                return Err(err.into());
            }
        }

        if let Err(err) = self.authority().charge(buyer, &seller, price).await {
            self.reactivate_listing(listing_id);
            return Err(match err {
                AuthorityError::Rejected(msg) => MarketError::InsufficientFunds(msg),
                AuthorityError::Unavailable(msg) => MarketError::Unavailable(msg),
            });
        }

        if let Err(err) = self
            .authority()
            .transfer_token(&seller, buyer, &token)
            .await
        {
            // Give the payment back before deciding what the failure means.
            if let Err(refund_err) = self.authority().charge(&seller, buyer, price).await {
                error!(
                    listing = listing_id.0,
                    token = %token,
                    error = %refund_err,
                    "buyer refund failed after transfer failure"
                );
                return Err(MarketError::InvariantViolation(format!(
                    "token transfer failed and buyer refund failed: {}",
                    refund_err
                )));
            }
            return Err(match err {
                AuthorityError::Rejected(_) => {
                    let at = self.now_ms();
                    let mut state = self.write();
                    state.emit(at, LedgerEvent::ListingCancelled { listing_id });
                    warn!(listing = listing_id.0, token = %token, "listing stale; cancelled");
                    MarketError::StateConflict(
                        "Token ownership changed — listing is stale".into(),
                    )
                }
                AuthorityError::Unavailable(msg) => {
                    self.reactivate_listing(listing_id);
                    MarketError::Unavailable(msg)
                }
            });
        }

        let at = self.now_ms();
        let sale = Sale {
            reference: SaleReference::Listing { listing_id },
            buyer: buyer.clone(),
            seller: seller.clone(),
            token_id: token.clone(),
            price,
            at,
        };
        {
            let mut state = self.write();
            state.sales.push(sale.clone());
            state.emit(
                at,
                LedgerEvent::Sale {
                    listing_id: Some(listing_id),
                    buyer: buyer.clone(),
                    seller,
                    collection: token.collection().clone(),
                    token_id: token,
                    price,
                },
            );
        }
        info!(listing = listing_id.0, buyer = %buyer, price = %price, "sale settled");
        Ok(sale)
    }

    pub(crate) fn reactivate_listing(&self, listing_id: ListingId) {
        let mut state = self.write();
        if let Some(listing) = state.listings.get_mut(&listing_id) {
            listing.active = true;
        }
    }
}
