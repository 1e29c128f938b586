//! Token offers.
//!
//! An active offer keeps its full amount escrowed at the authority. Refunds
//! of replaced, cancelled or outbid offers are fire-and-forget: the offer is
//! already closed in the ledger, and a failed release only leaves funds in
//! escrow, which is logged for operator follow-up.

use mintbay_types::{AccountId, Amount, LedgerEvent, TokenId};
use tracing::{error, info};

use crate::authority::{AuthorityError, LedgerAuthority};
use crate::errors::MarketError;
use crate::ledger::types::{Offer, Sale, SaleReference};
use crate::ledger::MarketLedger;

impl<A: LedgerAuthority> MarketLedger<A> {
    /// Place an offer on a token, escrowing the full amount. A previous
    /// active offer from the same buyer is replaced and refunded.
    pub async fn make_offer(
        &self,
        buyer: &AccountId,
        token: &TokenId,
        amount: Amount,
    ) -> Result<Offer, MarketError> {
        if amount.is_zero() {
            return Err(MarketError::InvalidInput(
                "Offer amount must be greater than zero".into(),
            ));
        }
        {
            let state = self.read();
            state.collection_or_not_found(token.collection())?;
        }
        let owner = self
            .authority()
            .owner_of(token)
            .await?
            .ok_or_else(MarketError::token_not_found)?;
        if &owner == buyer {
            return Err(MarketError::InvalidInput(
                "Cannot make an offer on your own token".into(),
            ));
        }

        if let Err(err) = self.authority().hold_escrow(buyer, amount).await {
            return Err(match err {
                AuthorityError::Rejected(msg) => MarketError::InsufficientFunds(msg),
                AuthorityError::Unavailable(msg) => MarketError::Unavailable(msg),
            });
        }

        let now = self.now_ms();
        let offer = Offer {
            buyer: buyer.clone(),
            token_id: token.clone(),
            amount,
            active: true,
            created_at: now,
        };
        let replaced = {
            let mut state = self.write();
            let previous = state
                .offers
                .insert((token.clone(), buyer.clone()), offer.clone())
                .filter(|prev| prev.active);
            if previous.is_some() {
                state.emit(
                    now,
                    LedgerEvent::OfferCancelled {
                        collection: token.collection().clone(),
                        token_id: token.clone(),
                        buyer: buyer.clone(),
                    },
                );
            }
            state.emit(
                now,
                LedgerEvent::OfferMade {
                    collection: token.collection().clone(),
                    token_id: token.clone(),
                    buyer: buyer.clone(),
                    amount,
                },
            );
            previous
        };

        if let Some(previous) = replaced {
            if let Err(err) = self.authority().release_escrow(buyer, previous.amount).await {
                error!(
                    token = %token,
                    buyer = %buyer,
                    amount = %previous.amount,
                    error = %err,
                    "refund of replaced offer failed; funds remain in escrow"
                );
            }
        }
        info!(token = %token, buyer = %buyer, amount = %amount, "offer placed");
        Ok(offer)
    }

    pub async fn cancel_offer(
        &self,
        buyer: &AccountId,
        token: &TokenId,
    ) -> Result<(), MarketError> {
        let amount = {
            let at = self.now_ms();
            let mut state = self.write();
            let offer = state
                .offers
                .get_mut(&(token.clone(), buyer.clone()))
                .ok_or_else(MarketError::offer_not_found)?;
            if !offer.active {
                return Err(MarketError::StateConflict(
                    "Offer is no longer active".into(),
                ));
            }
            offer.active = false;
            let amount = offer.amount;
            state.emit(
                at,
                LedgerEvent::OfferCancelled {
                    collection: token.collection().clone(),
                    token_id: token.clone(),
                    buyer: buyer.clone(),
                },
            );
            amount
        };

        if let Err(err) = self.authority().release_escrow(buyer, amount).await {
            error!(
                token = %token,
                buyer = %buyer,
                amount = %amount,
                error = %err,
                "refund of cancelled offer failed; funds remain in escrow"
            );
        }
        Ok(())
    }

    /// Accept a buyer's offer as the token owner. Settles the swap, then
    /// retires the token's listing and every other active offer on it.
    pub async fn accept_offer(
        &self,
        owner: &AccountId,
        token: &TokenId,
        buyer: &AccountId,
    ) -> Result<Sale, MarketError> {
        let actual = self
            .authority()
            .owner_of(token)
            .await?
            .ok_or_else(MarketError::token_not_found)?;
        if &actual != owner {
            return Err(MarketError::only_owner("the token owner"));
        }

        let amount = {
            let mut state = self.write();
            let offer = state
                .offers
                .get_mut(&(token.clone(), buyer.clone()))
                .ok_or_else(MarketError::offer_not_found)?;
            if !offer.active {
                return Err(MarketError::StateConflict(
                    "Offer is no longer active".into(),
                ));
            }
            // Ownership can change after an offer is placed; the buyer may
            // now hold the token through some other trade.
            if &offer.buyer == owner {
                return Err(MarketError::StateConflict(
                    "Cannot accept your own offer".into(),
                ));
            }
            offer.active = false;
            offer.amount
        };

        if let Err(err) = self.authority().transfer_token(owner, buyer, token).await {
            self.reactivate_offer(token, buyer);
            return Err(err.into());
        }

        // Security boundary: the buyer's funds sit in escrow; pay the seller
        // from there, and undo the transfer if the payout fails.
        if let Err(err) = self.authority().release_escrow(owner, amount).await {
            if let Err(undo_err) = self.authority().transfer_token(buyer, owner, token).await {
                error!(
                    token = %token,
                    owner = %owner,
                    buyer = %buyer,
                    error = %undo_err,
                    "transfer rollback failed after payout failure"
                );
                return Err(MarketError::InvariantViolation(format!(
                    "offer payout failed and transfer rollback failed: {}",
                    undo_err
                )));
            }
            self.reactivate_offer(token, buyer);
            return Err(match err {
                AuthorityError::Rejected(msg) => MarketError::InvariantViolation(format!(
                    "offer escrow cannot cover payout: {}",
                    msg
                )),
                AuthorityError::Unavailable(msg) => MarketError::Unavailable(msg),
            });
        }

        let at = self.now_ms();
        let sale = Sale {
            reference: SaleReference::Offer,
            buyer: buyer.clone(),
            seller: owner.clone(),
            token_id: token.clone(),
            price: amount,
            at,
        };
        let refunds = {
            let mut state = self.write();
            state.sales.push(sale.clone());
            state.emit(
                at,
                LedgerEvent::Sale {
                    listing_id: None,
                    buyer: buyer.clone(),
                    seller: owner.clone(),
                    collection: token.collection().clone(),
                    token_id: token.clone(),
                    price: amount,
                },
            );
            // The seller's listing for this token, if any, is now stale.
            if let Some(listing_id) = state.active_listing_id(token) {
                if let Some(listing) = state.listings.get_mut(&listing_id) {
                    listing.active = false;
                }
                state.emit(at, LedgerEvent::ListingCancelled { listing_id });
            }
            // Outbid offers are closed and refunded.
            let stale: Vec<(TokenId, AccountId)> = state
                .offers
                .iter()
                .filter(|((t, b), o)| t == token && b != buyer && o.active)
                .map(|(key, _)| key.clone())
                .collect();
            let mut refunds: Vec<(AccountId, Amount)> = Vec::with_capacity(stale.len());
            for key in stale {
                let Some(other) = state.offers.get_mut(&key) else {
                    continue;
                };
                other.active = false;
                let other_buyer = other.buyer.clone();
                let other_amount = other.amount;
                state.emit(
                    at,
                    LedgerEvent::OfferCancelled {
                        collection: token.collection().clone(),
                        token_id: token.clone(),
                        buyer: other_buyer.clone(),
                    },
                );
                refunds.push((other_buyer, other_amount));
            }
            refunds
        };

        for (other_buyer, other_amount) in refunds {
            if let Err(err) = self
                .authority()
                .release_escrow(&other_buyer, other_amount)
                .await
            {
                error!(
                    token = %token,
                    buyer = %other_buyer,
                    amount = %other_amount,
                    error = %err,
                    "refund of outbid offer failed; funds remain in escrow"
                );
            }
        }
        info!(token = %token, seller = %owner, buyer = %buyer, amount = %amount, "offer accepted");
        Ok(sale)
    }

    fn reactivate_offer(&self, token: &TokenId, buyer: &AccountId) {
        let mut state = self.write();
        if let Some(offer) = state.offers.get_mut(&(token.clone(), buyer.clone())) {
            offer.active = true;
        }
    }
}
