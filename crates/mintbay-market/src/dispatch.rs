//! Single action entry point.
//!
//! Every mutating operation arrives as one tagged `Action` value, gets
//! routed to the matching ledger call and answers with that operation's
//! JSON output.

use mintbay_types::{AccountId, Amount, CollectionId, ListingId, TokenId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::authority::LedgerAuthority;
use crate::errors::MarketError;
use crate::ledger::types::{AllowlistConfig, CollectionConfig};
use crate::ledger::MarketLedger;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    CreateCollection {
        #[serde(flatten)]
        config: CollectionConfig,
    },
    SetAllowlist {
        collection_id: CollectionId,
        #[serde(flatten)]
        allowlist: AllowlistConfig,
    },
    UpdateCollectionPrice {
        collection_id: CollectionId,
        new_price: Amount,
    },
    PauseCollection {
        collection_id: CollectionId,
    },
    ResumeCollection {
        collection_id: CollectionId,
    },
    WithdrawRevenue {
        collection_id: CollectionId,
    },
    Mint {
        collection_id: CollectionId,
        quantity: u32,
        payment: Amount,
    },
    ListToken {
        token_id: TokenId,
        price: Amount,
    },
    DelistToken {
        listing_id: ListingId,
    },
    UpdatePrice {
        listing_id: ListingId,
        new_price: Amount,
    },
    Buy {
        listing_id: ListingId,
        payment: Amount,
    },
    MakeOffer {
        token_id: TokenId,
        amount: Amount,
    },
    CancelOffer {
        token_id: TokenId,
    },
    AcceptOffer {
        token_id: TokenId,
        buyer: AccountId,
    },
}

impl Action {
    /// Stable label for logs and counters.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateCollection { .. } => "create_collection",
            Self::SetAllowlist { .. } => "set_allowlist",
            Self::UpdateCollectionPrice { .. } => "update_collection_price",
            Self::PauseCollection { .. } => "pause_collection",
            Self::ResumeCollection { .. } => "resume_collection",
            Self::WithdrawRevenue { .. } => "withdraw_revenue",
            Self::Mint { .. } => "mint",
            Self::ListToken { .. } => "list_token",
            Self::DelistToken { .. } => "delist_token",
            Self::UpdatePrice { .. } => "update_price",
            Self::Buy { .. } => "buy",
            Self::MakeOffer { .. } => "make_offer",
            Self::CancelOffer { .. } => "cancel_offer",
            Self::AcceptOffer { .. } => "accept_offer",
        }
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, MarketError> {
    serde_json::to_value(value)
        .map_err(|e| MarketError::InternalError(format!("Failed to serialize result: {}", e)))
}

impl<A: LedgerAuthority> MarketLedger<A> {
    pub async fn execute(&self, actor: &AccountId, action: Action) -> Result<Value, MarketError> {
        match action {
            Action::CreateCollection { config } => {
                to_value(&self.create_collection(actor, config)?)
            }
            Action::SetAllowlist {
                collection_id,
                allowlist,
            } => to_value(&self.set_allowlist(actor, &collection_id, allowlist)?),
            Action::UpdateCollectionPrice {
                collection_id,
                new_price,
            } => to_value(&self.update_public_price(actor, &collection_id, new_price)?),
            Action::PauseCollection { collection_id } => {
                self.pause_collection(actor, &collection_id)?;
                Ok(json!({ "paused": true }))
            }
            Action::ResumeCollection { collection_id } => {
                self.resume_collection(actor, &collection_id)?;
                Ok(json!({ "paused": false }))
            }
            Action::WithdrawRevenue { collection_id } => {
                let amount = self.withdraw_revenue(actor, &collection_id).await?;
                Ok(json!({ "withdrawn": amount }))
            }
            Action::Mint {
                collection_id,
                quantity,
                payment,
            } => to_value(&self.mint(actor, &collection_id, quantity, payment).await?),
            Action::ListToken { token_id, price } => {
                to_value(&self.create_listing(actor, &token_id, price).await?)
            }
            Action::DelistToken { listing_id } => {
                self.cancel_listing(actor, listing_id)?;
                Ok(json!({ "cancelled": true }))
            }
            Action::UpdatePrice {
                listing_id,
                new_price,
            } => to_value(&self.update_listing_price(actor, listing_id, new_price)?),
            Action::Buy {
                listing_id,
                payment,
            } => to_value(&self.buy(actor, listing_id, payment).await?),
            Action::MakeOffer { token_id, amount } => {
                to_value(&self.make_offer(actor, &token_id, amount).await?)
            }
            Action::CancelOffer { token_id } => {
                self.cancel_offer(actor, &token_id).await?;
                Ok(json!({ "cancelled": true }))
            }
            Action::AcceptOffer { token_id, buyer } => {
                to_value(&self.accept_offer(actor, &token_id, &buyer).await?)
            }
        }
    }
}
