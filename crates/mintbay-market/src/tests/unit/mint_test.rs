use mintbay_types::{AccountId, Amount, CollectionId};

use crate::tests::test_utils::*;
use crate::*;

fn drop_id() -> CollectionId {
    "drop-01".parse().unwrap()
}

// --- Happy path ---

#[tokio::test]
async fn mint_single_token() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");

    let receipt = ledger
        .mint(&buyer(), &drop_id(), 1, Amount(10))
        .await
        .unwrap();

    assert_eq!(receipt.token_ids, vec![token("drop-01:1")]);
    assert_eq!(receipt.stage, StageKind::Public);
    assert_eq!(receipt.unit_price, Amount(10));
    assert_eq!(receipt.total_paid, Amount(10));

    let collection = ledger.collection(&drop_id()).unwrap();
    assert_eq!(collection.supply, 1);
    assert_eq!(collection.total_revenue, Amount(10));
    assert_eq!(ledger.minted_by(&drop_id(), &buyer()), 1);
    assert_eq!(ledger.authority().balance(&buyer()), Amount(FUNDS - 10));
    assert_eq!(ledger.authority().escrow_total(), Amount(10));
    assert_eq!(ledger.authority().token_owner(&token("drop-01:1")), Some(buyer()));
}

#[tokio::test]
async fn mint_batch_allocates_sequential_indices() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");

    let receipt = ledger
        .mint(&buyer(), &drop_id(), 3, Amount(30))
        .await
        .unwrap();
    assert_eq!(
        receipt.token_ids,
        vec![token("drop-01:1"), token("drop-01:2"), token("drop-01:3")]
    );

    let receipt = ledger
        .mint(&bidder(), &drop_id(), 1, Amount(10))
        .await
        .unwrap();
    assert_eq!(receipt.token_ids, vec![token("drop-01:4")]);
}

#[tokio::test]
async fn free_mint_moves_no_funds() {
    let (ledger, _) = setup_market();
    let mut config = drop_config("drop-01");
    config.public_price = Amount::ZERO;
    ledger.create_collection(&creator(), config).unwrap();

    let receipt = ledger
        .mint(&buyer(), &drop_id(), 2, Amount::ZERO)
        .await
        .unwrap();
    assert_eq!(receipt.total_paid, Amount::ZERO);
    assert_eq!(ledger.authority().balance(&buyer()), Amount(FUNDS));
    assert_eq!(ledger.authority().escrow_total(), Amount::ZERO);
}

// --- Quantity and payment validation ---

#[tokio::test]
async fn mint_zero_quantity_fails() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");
    let err = ledger
        .mint(&buyer(), &drop_id(), 0, Amount::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::InvalidInput(_)));
}

#[tokio::test]
async fn mint_over_batch_limit_fails() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");
    let err = ledger
        .mint(&buyer(), &drop_id(), MAX_BATCH_MINT + 1, Amount(110))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::InvalidInput(_)));
}

#[tokio::test]
async fn mint_unknown_collection_fails() {
    let (ledger, _) = setup_market();
    let err = ledger
        .mint(&buyer(), &drop_id(), 1, Amount(10))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::NotFound(_)));
}

#[tokio::test]
async fn underpayment_is_insufficient_funds() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");
    let err = ledger
        .mint(&buyer(), &drop_id(), 2, Amount(19))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::InsufficientFunds(_)));
}

#[tokio::test]
async fn overpayment_is_rejected() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");
    let err = ledger
        .mint(&buyer(), &drop_id(), 1, Amount(11))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::InvalidInput(_)));
    assert_eq!(ledger.collection(&drop_id()).unwrap().supply, 0);
}

// --- Stage pricing ---

#[tokio::test]
async fn member_mints_at_allowlist_price() {
    let (ledger, _) = setup_market();
    let mut config = drop_config("drop-01");
    config.allowlist = Some(allowlist_of(&[buyer()], 5, 60_000, 2));
    ledger.create_collection(&creator(), config).unwrap();

    let receipt = ledger
        .mint(&buyer(), &drop_id(), 1, Amount(5))
        .await
        .unwrap();
    assert_eq!(receipt.stage, StageKind::Allowlist);
    assert_eq!(receipt.unit_price, Amount(5));

    // Non-members pay the public price during the window.
    let receipt = ledger
        .mint(&bidder(), &drop_id(), 1, Amount(10))
        .await
        .unwrap();
    assert_eq!(receipt.stage, StageKind::Public);
}

#[tokio::test]
async fn member_quota_is_tracked_across_mints() {
    let (ledger, _) = setup_market();
    let mut config = drop_config("drop-01");
    config.allowlist = Some(allowlist_of(&[buyer()], 5, 60_000, 2));
    ledger.create_collection(&creator(), config).unwrap();

    ledger.mint(&buyer(), &drop_id(), 2, Amount(10)).await.unwrap();
    let err = ledger
        .mint(&buyer(), &drop_id(), 1, Amount(5))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MarketError::MintRejected(MintReject::QuotaExceeded {
            minted: 2,
            requested: 1,
            quota: 2
        })
    ));
}

#[tokio::test]
async fn window_close_moves_member_to_public_price() {
    let (ledger, clock) = setup_market();
    let mut config = drop_config("drop-01");
    config.allowlist = Some(allowlist_of(&[buyer()], 5, 60_000, 2));
    ledger.create_collection(&creator(), config).unwrap();

    clock.advance(60_000);
    let receipt = ledger
        .mint(&buyer(), &drop_id(), 1, Amount(10))
        .await
        .unwrap();
    assert_eq!(receipt.stage, StageKind::Public);
}

// --- Supply exhaustion ---

#[tokio::test]
async fn sold_out_collection_rejects() {
    let (ledger, _) = setup_market();
    let mut config = drop_config("drop-01");
    config.max_supply = 3;
    ledger.create_collection(&creator(), config).unwrap();

    ledger.mint(&buyer(), &drop_id(), 3, Amount(30)).await.unwrap();
    let err = ledger
        .mint(&bidder(), &drop_id(), 1, Amount(10))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MarketError::MintRejected(MintReject::SoldOut)
    ));
}

#[tokio::test]
async fn partial_remainder_is_supply_exceeded() {
    let (ledger, _) = setup_market();
    let mut config = drop_config("drop-01");
    config.max_supply = 3;
    ledger.create_collection(&creator(), config).unwrap();

    ledger.mint(&buyer(), &drop_id(), 2, Amount(20)).await.unwrap();
    let err = ledger
        .mint(&bidder(), &drop_id(), 2, Amount(20))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MarketError::MintRejected(MintReject::SupplyExceeded {
            remaining: 1,
            requested: 2
        })
    ));
}

// --- Settlement failures ---

#[tokio::test]
async fn broke_wallet_cannot_claim_supply() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");
    let pauper: AccountId = "pauper".parse().unwrap();

    let err = ledger
        .mint(&pauper, &drop_id(), 1, Amount(10))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::InsufficientFunds(_)));
    assert_eq!(ledger.collection(&drop_id()).unwrap().supply, 0);
    assert_eq!(ledger.minted_by(&drop_id(), &pauper), 0);
    assert_eq!(ledger.authority().escrow_total(), Amount::ZERO);
}

#[tokio::test]
async fn failed_token_mint_refunds_and_rolls_back() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");

    ledger.authority().fail_next(
        AuthorityOp::MintTokens,
        AuthorityError::Unavailable("authority offline".into()),
    );
    let err = ledger
        .mint(&buyer(), &drop_id(), 2, Amount(20))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::Unavailable(_)));

    let collection = ledger.collection(&drop_id()).unwrap();
    assert_eq!(collection.supply, 0);
    assert_eq!(collection.total_revenue, Amount::ZERO);
    assert_eq!(ledger.minted_by(&drop_id(), &buyer()), 0);
    assert_eq!(ledger.authority().balance(&buyer()), Amount(FUNDS));
    assert_eq!(ledger.authority().escrow_total(), Amount::ZERO);
}

#[tokio::test]
async fn rolled_back_claim_never_reuses_indices() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");

    ledger.authority().fail_next(
        AuthorityOp::MintTokens,
        AuthorityError::Unavailable("authority offline".into()),
    );
    ledger
        .mint(&buyer(), &drop_id(), 2, Amount(20))
        .await
        .unwrap_err();

    // Indices 1-2 were consumed by the failed claim.
    let receipt = ledger
        .mint(&buyer(), &drop_id(), 1, Amount(10))
        .await
        .unwrap();
    assert_eq!(receipt.token_ids, vec![token("drop-01:3")]);
    assert_eq!(ledger.collection(&drop_id()).unwrap().supply, 1);
}

#[tokio::test]
async fn stuck_refund_still_rolls_back_supply() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");

    ledger.authority().fail_next(
        AuthorityOp::MintTokens,
        AuthorityError::Unavailable("authority offline".into()),
    );
    ledger.authority().fail_next(
        AuthorityOp::ReleaseEscrow,
        AuthorityError::Unavailable("authority offline".into()),
    );
    let err = ledger
        .mint(&buyer(), &drop_id(), 1, Amount(10))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::Unavailable(_)));

    // Supply is released for other buyers; the payment stays in escrow for
    // operator follow-up.
    assert_eq!(ledger.collection(&drop_id()).unwrap().supply, 0);
    assert_eq!(ledger.authority().escrow_total(), Amount(10));
    assert_eq!(ledger.authority().balance(&buyer()), Amount(FUNDS - 10));
}
