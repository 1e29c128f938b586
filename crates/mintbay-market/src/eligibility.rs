//! Mint eligibility engine: a pure function of collection state, requester,
//! and time. Holds nothing mutable, so concurrent evaluation needs no
//! coordination; the ledger enforces the outcome under its own lock.

use mintbay_types::{AccountId, Amount};
use serde::{Deserialize, Serialize};

use crate::ledger::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Allowlist,
    Public,
}

/// A granted mint authorization: which stage matched and at what price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MintQuote {
    pub stage: StageKind,
    pub unit_price: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum MintReject {
    SoldOut,
    NotAllowlisted,
    QuotaExceeded {
        minted: u32,
        requested: u32,
        quota: u32,
    },
    SupplyExceeded {
        remaining: u32,
        requested: u32,
    },
    NoActiveStage,
}

impl std::fmt::Display for MintReject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SoldOut => write!(f, "Sold out"),
            Self::NotAllowlisted => write!(
                f,
                "Collection has not opened — early access requires allowlist"
            ),
            Self::QuotaExceeded {
                minted,
                requested,
                quota,
            } => write!(
                f,
                "Exceeds per-wallet limit: minted {}, requesting {}, max {}",
                minted, requested, quota
            ),
            Self::SupplyExceeded {
                remaining,
                requested,
            } => write!(
                f,
                "Only {} items remaining, requested {}",
                remaining, requested
            ),
            Self::NoActiveStage => write!(f, "Collection is not open for minting"),
        }
    }
}

/// Evaluate a mint request. `already_minted` is the requester's persisted
/// per-collection counter; `quantity` is validated non-zero by the caller.
///
/// Decision order: sold-out always wins; paused or past-close yields
/// `NoActiveStage`; members of an open allowlist window settle on allowlist
/// terms alone (an exhausted member quota does not fall through to public);
/// everyone else evaluates the public stage.
pub fn evaluate_mint(
    collection: &Collection,
    requester: &AccountId,
    quantity: u32,
    already_minted: u32,
    now_ms: u64,
) -> Result<MintQuote, MintReject> {
    if collection.supply >= collection.max_supply {
        return Err(MintReject::SoldOut);
    }
    if collection.paused {
        return Err(MintReject::NoActiveStage);
    }
    if let Some(end) = collection.closes_at {
        if now_ms > end {
            return Err(MintReject::NoActiveStage);
        }
    }

    let remaining = collection.max_supply - collection.supply;
    let stage = collection
        .allowlist
        .as_ref()
        .filter(|stage| stage.is_active(now_ms));

    if let Some(stage) = stage {
        if stage.members.contains(requester) {
            if quantity > remaining {
                return Err(MintReject::SupplyExceeded {
                    remaining,
                    requested: quantity,
                });
            }
            if already_minted.saturating_add(quantity) > stage.member_quota {
                return Err(MintReject::QuotaExceeded {
                    minted: already_minted,
                    requested: quantity,
                    quota: stage.member_quota,
                });
            }
            return Ok(MintQuote {
                stage: StageKind::Allowlist,
                unit_price: stage.price,
            });
        }
    }

    let before_open = collection.opens_at.is_some_and(|start| now_ms < start);
    if before_open {
        return Err(if stage.is_some() {
            MintReject::NotAllowlisted
        } else {
            MintReject::NoActiveStage
        });
    }

    if quantity > remaining {
        return Err(MintReject::SupplyExceeded {
            remaining,
            requested: quantity,
        });
    }
    if let Some(quota) = collection.wallet_quota {
        if already_minted.saturating_add(quantity) > quota {
            return Err(MintReject::QuotaExceeded {
                minted: already_minted,
                requested: quantity,
                quota,
            });
        }
    }
    Ok(MintQuote {
        stage: StageKind::Public,
        unit_price: collection.public_price,
    })
}
