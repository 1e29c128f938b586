//! Primary-market minting.
//!
//! Supply, the per-wallet count and accrued revenue are claimed under the
//! write lock before any settlement call; a failed settlement rolls the
//! claim back. The token index allocator is the one counter that never
//! rolls back, so retried mints get fresh edition numbers.

use mintbay_types::{AccountId, Amount, CollectionId, LedgerEvent, TokenId};
use tracing::{error, info, warn};

use crate::authority::{AuthorityError, LedgerAuthority};
use crate::constants::MAX_BATCH_MINT;
use crate::eligibility::evaluate_mint;
use crate::errors::MarketError;
use crate::ledger::types::MintReceipt;
use crate::ledger::MarketLedger;

impl<A: LedgerAuthority> MarketLedger<A> {
    pub async fn mint(
        &self,
        buyer: &AccountId,
        collection_id: &CollectionId,
        quantity: u32,
        payment: Amount,
    ) -> Result<MintReceipt, MarketError> {
        if quantity == 0 || quantity > MAX_BATCH_MINT {
            return Err(MarketError::InvalidInput(format!(
                "Quantity must be 1-{}",
                MAX_BATCH_MINT
            )));
        }

        let now = self.now_ms();
        let (token_ids, stage, unit_price, total) = {
            let mut state = self.write();
            let already = state
                .mint_counts
                .get(&(collection_id.clone(), buyer.clone()))
                .copied()
                .unwrap_or(0);
            let collection = state
                .collections
                .get_mut(collection_id)
                .ok_or_else(MarketError::collection_not_found)?;
            let quote = evaluate_mint(collection, buyer, quantity, already, now)?;
            let total = quote
                .unit_price
                .checked_mul(quantity)
                .ok_or_else(|| MarketError::InternalError("Price overflow".into()))?;
            if payment != total {
                let msg = format!(
                    "Mint requires exact payment: required {}, got {}",
                    total, payment
                );
                return Err(if payment < total {
                    MarketError::InsufficientFunds(msg)
                } else {
                    MarketError::InvalidInput(msg)
                });
            }
            let new_revenue = collection
                .total_revenue
                .checked_add(total)
                .ok_or_else(|| MarketError::InternalError("Revenue overflow".into()))?;
            let last = collection
                .next_index
                .checked_add(quantity)
                .ok_or_else(|| {
                    MarketError::InternalError("Token index space exhausted".into())
                })?;
            let token_ids: Vec<TokenId> = (collection.next_index + 1..=last)
                .map(|index| TokenId::new(collection_id.clone(), index))
                .collect();
            collection.supply += quantity;
            collection.next_index = last;
            collection.total_revenue = new_revenue;
            let count = state
                .mint_counts
                .entry((collection_id.clone(), buyer.clone()))
                .or_insert(0);
            *count += quantity;
            (token_ids, quote.stage, quote.unit_price, total)
        };

        if let Err(err) = self.authority().hold_escrow(buyer, total).await {
            self.rollback_mint(collection_id, buyer, quantity, total);
            return Err(match err {
                AuthorityError::Rejected(msg) => MarketError::InsufficientFunds(msg),
                AuthorityError::Unavailable(msg) => MarketError::Unavailable(msg),
            });
        }

        if let Err(err) = self.authority().mint_tokens(buyer, &token_ids).await {
            // Storage/accounting invariant: refund the held payment before
            // rolling back the claimed supply.
            if let Err(refund_err) = self.authority().release_escrow(buyer, total).await {
                error!(
                    collection = %collection_id,
                    buyer = %buyer,
                    amount = %total,
                    error = %refund_err,
                    "mint refund failed; escrow still holds the payment"
                );
            }
            self.rollback_mint(collection_id, buyer, quantity, total);
            return Err(match err {
                AuthorityError::Rejected(msg) => MarketError::InvariantViolation(format!(
                    "token mint rejected for freshly allocated ids: {}",
                    msg
                )),
                AuthorityError::Unavailable(msg) => MarketError::Unavailable(msg),
            });
        }

        let at = self.now_ms();
        {
            let mut state = self.write();
            state.emit(
                at,
                LedgerEvent::Minted {
                    collection: collection_id.clone(),
                    receiver: buyer.clone(),
                    quantity,
                    total_paid: total,
                },
            );
        }
        info!(
            collection = %collection_id,
            receiver = %buyer,
            quantity,
            total = %total,
            "mint settled"
        );
        Ok(MintReceipt {
            token_ids,
            stage,
            unit_price,
            total_paid: total,
        })
    }

    fn rollback_mint(
        &self,
        collection_id: &CollectionId,
        buyer: &AccountId,
        quantity: u32,
        total: Amount,
    ) {
        warn!(
            collection = %collection_id,
            buyer = %buyer,
            quantity,
            "mint settlement failed; rolling back claim"
        );
        let mut state = self.write();
        if let Some(collection) = state.collections.get_mut(collection_id) {
            collection.supply = collection.supply.saturating_sub(quantity);
            collection.total_revenue = collection.total_revenue.saturating_sub(total);
        }
        let key = (collection_id.clone(), buyer.clone());
        if let Some(count) = state.mint_counts.get(&key).copied() {
            if count <= quantity {
                state.mint_counts.remove(&key);
            } else {
                state.mint_counts.insert(key, count - quantity);
            }
        }
    }
}
