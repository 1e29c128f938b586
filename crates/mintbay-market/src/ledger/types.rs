use std::collections::BTreeSet;

use mintbay_types::{AccountId, Amount, CollectionId, ContentLocator, ListingId, TokenId};
use serde::{Deserialize, Serialize};

use crate::eligibility::StageKind;

/// Timed early-access stage. Active strictly while `now < ends_at`, so a
/// zero-duration stage is never active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowlistStage {
    pub price: Amount,
    pub ends_at: u64,
    pub member_quota: u32,
    pub members: BTreeSet<AccountId>,
}

impl AllowlistStage {
    pub fn is_active(&self, now_ms: u64) -> bool {
        now_ms < self.ends_at
    }

    pub fn is_member(&self, account: &AccountId) -> bool {
        self.members.contains(account)
    }
}

/// Allowlist parameters as submitted; `ends_at` is fixed when the stage is
/// installed (configuration time plus `duration_ms`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowlistConfig {
    pub price: Amount,
    pub duration_ms: u64,
    pub member_quota: u32,
    pub members: Vec<AccountId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub creator: AccountId,
    pub name: String,
    pub symbol: String,
    pub max_supply: u32,
    // Invariant: supply <= max_supply.
    pub supply: u32,
    // Token index allocator; advances on every claim and never rolls back,
    // so a failed settlement cannot cause index reuse.
    pub next_index: u32,
    pub public_price: Amount,
    #[serde(default)]
    pub wallet_quota: Option<u32>,
    #[serde(default)]
    pub allowlist: Option<AllowlistStage>,
    #[serde(default)]
    pub opens_at: Option<u64>,
    #[serde(default)]
    pub closes_at: Option<u64>,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub metadata: Option<ContentLocator>,
    // Cumulative primary-sale revenue; `withdrawn` never exceeds it.
    #[serde(default)]
    pub total_revenue: Amount,
    #[serde(default)]
    pub withdrawn: Amount,
    pub created_at: u64,
}

impl Collection {
    pub fn remaining(&self) -> u32 {
        self.max_supply - self.supply
    }

    pub fn is_sold_out(&self) -> bool {
        self.supply >= self.max_supply
    }

    pub fn accrued(&self) -> Amount {
        self.total_revenue.saturating_sub(self.withdrawn)
    }
}

/// Creation parameters for a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub id: CollectionId,
    pub name: String,
    pub symbol: String,
    pub max_supply: u32,
    pub public_price: Amount,
    #[serde(default)]
    pub wallet_quota: Option<u32>,
    #[serde(default)]
    pub opens_at: Option<u64>,
    #[serde(default)]
    pub closes_at: Option<u64>,
    #[serde(default)]
    pub allowlist: Option<AllowlistConfig>,
    #[serde(default)]
    pub metadata: Option<ContentLocator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub seller: AccountId,
    pub token_id: TokenId,
    pub price: Amount,
    // State transition invariant: cleared at the claim step of buy/cancel,
    // before any settlement side effects.
    pub active: bool,
    pub created_at: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub buyer: AccountId,
    pub token_id: TokenId,
    // Escrowed in full at the authority while the offer is active.
    pub amount: Amount,
    pub active: bool,
    pub created_at: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum SaleReference {
    Listing { listing_id: ListingId },
    Offer,
}

/// Immutable record of a completed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    #[serde(flatten)]
    pub reference: SaleReference,
    pub buyer: AccountId,
    pub seller: AccountId,
    pub token_id: TokenId,
    pub price: Amount,
    pub at: u64,
}

/// Outcome of a successful mint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub token_ids: Vec<TokenId>,
    pub stage: StageKind,
    pub unit_price: Amount,
    pub total_paid: Amount,
}
