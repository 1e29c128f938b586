//! Secondary-market listings.

use mintbay_types::{AccountId, Amount, LedgerEvent, ListingId, TokenId};
use tracing::info;

use crate::authority::LedgerAuthority;
use crate::errors::MarketError;
use crate::ledger::types::Listing;
use crate::ledger::MarketLedger;

impl<A: LedgerAuthority> MarketLedger<A> {
    /// List an owned token for sale. Ownership and marketplace custody are
    /// checked against the authority before the listing is recorded; the
    /// buy path re-checks ownership, so a transfer after listing leaves a
    /// stale listing rather than a bad sale.
    pub async fn create_listing(
        &self,
        seller: &AccountId,
        token: &TokenId,
        price: Amount,
    ) -> Result<Listing, MarketError> {
        if price.is_zero() {
            return Err(MarketError::InvalidInput(
                "Price must be greater than zero".into(),
            ));
        }
        {
            let state = self.read();
            state.collection_or_not_found(token.collection())?;
            if state.active_listing_id(token).is_some() {
                return Err(MarketError::StateConflict(
                    "Token is already listed for sale".into(),
                ));
            }
        }

        let owner = self
            .authority()
            .owner_of(token)
            .await?
            .ok_or_else(MarketError::token_not_found)?;
        if &owner != seller {
            return Err(MarketError::only_owner("the token owner"));
        }
        if !self.authority().custody_approved(seller, token).await? {
            return Err(MarketError::StateConflict(
                "Marketplace is not approved to transfer this token".into(),
            ));
        }

        let now = self.now_ms();
        let mut state = self.write();
        // Re-check under the lock; a concurrent call may have won the race.
        if state.active_listing_id(token).is_some() {
            return Err(MarketError::StateConflict(
                "Token is already listed for sale".into(),
            ));
        }
        state.next_listing_id += 1;
        let listing = Listing {
            id: ListingId(state.next_listing_id),
            seller: seller.clone(),
            token_id: token.clone(),
            price,
            active: true,
            created_at: now,
        };
        state.listings.insert(listing.id, listing.clone());
        state.token_listing.insert(token.clone(), listing.id);
        state.emit(
            now,
            LedgerEvent::ListingCreated {
                listing_id: listing.id,
                seller: seller.clone(),
                collection: token.collection().clone(),
                token_id: token.clone(),
                price,
            },
        );
        info!(listing = listing.id.0, token = %token, price = %price, "listing created");
        Ok(listing)
    }

    pub fn cancel_listing(
        &self,
        actor: &AccountId,
        listing_id: ListingId,
    ) -> Result<(), MarketError> {
        let at = self.now_ms();
        let mut state = self.write();
        let listing = state
            .listings
            .get_mut(&listing_id)
            .ok_or_else(MarketError::listing_not_found)?;
        if &listing.seller != actor {
            return Err(MarketError::only_owner("the seller"));
        }
        if !listing.active {
            return Err(MarketError::StateConflict(
                "Listing is no longer active".into(),
            ));
        }
        listing.active = false;
        state.emit(at, LedgerEvent::ListingCancelled { listing_id });
        info!(listing = listing_id.0, "listing cancelled");
        Ok(())
    }

    pub fn update_listing_price(
        &self,
        actor: &AccountId,
        listing_id: ListingId,
        new_price: Amount,
    ) -> Result<Listing, MarketError> {
        if new_price.is_zero() {
            return Err(MarketError::InvalidInput(
                "Price must be greater than zero".into(),
            ));
        }
        let at = self.now_ms();
        let mut state = self.write();
        let listing = state
            .listings
            .get_mut(&listing_id)
            .ok_or_else(MarketError::listing_not_found)?;
        if &listing.seller != actor {
            return Err(MarketError::only_owner("the seller"));
        }
        if !listing.active {
            return Err(MarketError::StateConflict(
                "Listing is no longer active".into(),
            ));
        }
        listing.price = new_price;
        let updated = listing.clone();
        state.emit(
            at,
            LedgerEvent::ListingPriceUpdated {
                listing_id,
                price: new_price,
            },
        );
        Ok(updated)
    }
}
