//! Collection lifecycle: creation, creator configuration, revenue payout.

use mintbay_types::{AccountId, Amount, CollectionId, LedgerEvent};
use tracing::info;

use crate::authority::{AuthorityError, LedgerAuthority};
use crate::constants::{MAX_COLLECTION_SUPPLY, MAX_NAME_LEN, MAX_SYMBOL_LEN};
use crate::errors::MarketError;
use crate::ledger::types::{AllowlistConfig, AllowlistStage, Collection, CollectionConfig};
use crate::ledger::MarketLedger;

fn build_stage(config: AllowlistConfig, now_ms: u64) -> Result<AllowlistStage, MarketError> {
    if config.member_quota == 0 {
        return Err(MarketError::InvalidInput(
            "Allowlist member quota must be at least 1".into(),
        ));
    }
    Ok(AllowlistStage {
        price: config.price,
        // Zero duration pins ends_at to now: the stage is never active.
        ends_at: now_ms.saturating_add(config.duration_ms),
        member_quota: config.member_quota,
        members: config.members.into_iter().collect(),
    })
}

impl<A: LedgerAuthority> MarketLedger<A> {
    pub fn create_collection(
        &self,
        creator: &AccountId,
        config: CollectionConfig,
    ) -> Result<Collection, MarketError> {
        if config.max_supply == 0 || config.max_supply > MAX_COLLECTION_SUPPLY {
            return Err(MarketError::InvalidInput(format!(
                "Supply must be 1-{}",
                MAX_COLLECTION_SUPPLY
            )));
        }
        if config.name.is_empty() || config.name.len() > MAX_NAME_LEN {
            return Err(MarketError::InvalidInput(format!(
                "Name must be 1-{} characters",
                MAX_NAME_LEN
            )));
        }
        if config.symbol.is_empty() || config.symbol.len() > MAX_SYMBOL_LEN {
            return Err(MarketError::InvalidInput(format!(
                "Symbol must be 1-{} characters",
                MAX_SYMBOL_LEN
            )));
        }
        if let (Some(open), Some(close)) = (config.opens_at, config.closes_at) {
            if close <= open {
                return Err(MarketError::InvalidInput(
                    "Close time must be after open time".into(),
                ));
            }
        }
        let now = self.now_ms();
        if let Some(close) = config.closes_at {
            if close <= now {
                return Err(MarketError::InvalidInput(
                    "Close time must be in the future".into(),
                ));
            }
        }
        let allowlist = config.allowlist.map(|al| build_stage(al, now)).transpose()?;

        let collection = Collection {
            id: config.id.clone(),
            creator: creator.clone(),
            name: config.name,
            symbol: config.symbol,
            max_supply: config.max_supply,
            supply: 0,
            next_index: 0,
            public_price: config.public_price,
            wallet_quota: config.wallet_quota,
            allowlist,
            opens_at: config.opens_at,
            closes_at: config.closes_at,
            paused: false,
            metadata: config.metadata,
            total_revenue: Amount::ZERO,
            withdrawn: Amount::ZERO,
            created_at: now,
        };

        let mut state = self.write();
        if state.collections.contains_key(&collection.id) {
            return Err(MarketError::StateConflict(
                "Collection already exists".into(),
            ));
        }
        state.emit(
            now,
            LedgerEvent::CollectionCreated {
                collection: collection.id.clone(),
                name: collection.name.clone(),
                symbol: collection.symbol.clone(),
                creator: creator.clone(),
            },
        );
        state
            .collections
            .insert(collection.id.clone(), collection.clone());
        info!(collection = %collection.id, creator = %creator, "collection created");
        Ok(collection)
    }

    /// Replace the allowlist stage. The window restarts from now.
    pub fn set_allowlist(
        &self,
        actor: &AccountId,
        collection_id: &CollectionId,
        config: AllowlistConfig,
    ) -> Result<Collection, MarketError> {
        let stage = build_stage(config, self.now_ms())?;
        let mut state = self.write();
        let collection = state
            .collections
            .get_mut(collection_id)
            .ok_or_else(MarketError::collection_not_found)?;
        if &collection.creator != actor {
            return Err(MarketError::only_owner("the collection creator"));
        }
        collection.allowlist = Some(stage);
        Ok(collection.clone())
    }

    pub fn update_public_price(
        &self,
        actor: &AccountId,
        collection_id: &CollectionId,
        new_price: Amount,
    ) -> Result<Collection, MarketError> {
        let mut state = self.write();
        let collection = state
            .collections
            .get_mut(collection_id)
            .ok_or_else(MarketError::collection_not_found)?;
        if &collection.creator != actor {
            return Err(MarketError::only_owner("the collection creator"));
        }
        collection.public_price = new_price;
        Ok(collection.clone())
    }

    pub fn pause_collection(
        &self,
        actor: &AccountId,
        collection_id: &CollectionId,
    ) -> Result<(), MarketError> {
        self.set_paused(actor, collection_id, true)
    }

    pub fn resume_collection(
        &self,
        actor: &AccountId,
        collection_id: &CollectionId,
    ) -> Result<(), MarketError> {
        self.set_paused(actor, collection_id, false)
    }

    fn set_paused(
        &self,
        actor: &AccountId,
        collection_id: &CollectionId,
        paused: bool,
    ) -> Result<(), MarketError> {
        let mut state = self.write();
        let collection = state
            .collections
            .get_mut(collection_id)
            .ok_or_else(MarketError::collection_not_found)?;
        if &collection.creator != actor {
            return Err(MarketError::only_owner("the collection creator"));
        }
        if collection.paused == paused {
            return Err(MarketError::StateConflict(if paused {
                "Collection is already paused".into()
            } else {
                "Collection is not paused".into()
            }));
        }
        collection.paused = paused;
        Ok(())
    }

    /// Pay out accrued mint revenue to the creator.
    pub async fn withdraw_revenue(
        &self,
        actor: &AccountId,
        collection_id: &CollectionId,
    ) -> Result<Amount, MarketError> {
        // Claim the accrued amount before settlement.
        let accrued = {
            let mut state = self.write();
            let collection = state
                .collections
                .get_mut(collection_id)
                .ok_or_else(MarketError::collection_not_found)?;
            if &collection.creator != actor {
                return Err(MarketError::only_owner("the collection creator"));
            }
            let accrued = collection.accrued();
            if accrued.is_zero() {
                return Err(MarketError::StateConflict("No revenue to withdraw".into()));
            }
            collection.withdrawn = collection
                .withdrawn
                .checked_add(accrued)
                .ok_or_else(|| MarketError::InternalError("Withdrawal overflow".into()))?;
            accrued
        };

        if let Err(err) = self.authority().release_escrow(actor, accrued).await {
            // Rollback the claim so the revenue stays withdrawable.
            let mut state = self.write();
            if let Some(collection) = state.collections.get_mut(collection_id) {
                collection.withdrawn = collection.withdrawn.saturating_sub(accrued);
            }
            return Err(match err {
                AuthorityError::Unavailable(msg) => MarketError::Unavailable(msg),
                AuthorityError::Rejected(msg) => MarketError::InvariantViolation(format!(
                    "revenue escrow cannot cover withdrawal: {}",
                    msg
                )),
            });
        }
        info!(collection = %collection_id, creator = %actor, amount = %accrued, "revenue withdrawn");
        Ok(accrued)
    }
}
