use mintbay_types::Amount;

use crate::tests::test_utils::*;
use crate::*;

// --- Creation ---

#[test]
fn create_collection_happy_path() {
    let (ledger, _) = setup_market();
    let collection = ledger
        .create_collection(&creator(), drop_config("drop-01"))
        .unwrap();

    assert_eq!(collection.supply, 0);
    assert_eq!(collection.remaining(), 100);
    assert_eq!(collection.total_revenue, Amount::ZERO);
    assert_eq!(collection.created_at, NOW);
    assert_eq!(ledger.head_seq(), 1);
    assert_eq!(ledger.collections().len(), 1);
}

#[test]
fn create_rejects_zero_supply() {
    let (ledger, _) = setup_market();
    let mut config = drop_config("drop-01");
    config.max_supply = 0;
    let err = ledger.create_collection(&creator(), config).unwrap_err();
    assert!(matches!(err, MarketError::InvalidInput(_)));
}

#[test]
fn create_rejects_oversized_supply() {
    let (ledger, _) = setup_market();
    let mut config = drop_config("drop-01");
    config.max_supply = MAX_COLLECTION_SUPPLY + 1;
    let err = ledger.create_collection(&creator(), config).unwrap_err();
    assert!(matches!(err, MarketError::InvalidInput(_)));
}

#[test]
fn create_rejects_empty_name_and_symbol() {
    let (ledger, _) = setup_market();
    let mut config = drop_config("drop-01");
    config.name = String::new();
    let err = ledger.create_collection(&creator(), config).unwrap_err();
    assert!(matches!(err, MarketError::InvalidInput(_)));

    let mut config = drop_config("drop-02");
    config.symbol = "X".repeat(MAX_SYMBOL_LEN + 1);
    let err = ledger.create_collection(&creator(), config).unwrap_err();
    assert!(matches!(err, MarketError::InvalidInput(_)));
}

#[test]
fn create_rejects_inverted_schedule() {
    let (ledger, _) = setup_market();
    let mut config = drop_config("drop-01");
    config.opens_at = Some(NOW + 10_000);
    config.closes_at = Some(NOW + 5_000);
    let err = ledger.create_collection(&creator(), config).unwrap_err();
    assert!(matches!(err, MarketError::InvalidInput(_)));
}

#[test]
fn create_rejects_close_in_the_past() {
    let (ledger, _) = setup_market();
    let mut config = drop_config("drop-01");
    config.closes_at = Some(NOW - 1);
    let err = ledger.create_collection(&creator(), config).unwrap_err();
    assert!(matches!(err, MarketError::InvalidInput(_)));
}

#[test]
fn create_rejects_zero_member_quota() {
    let (ledger, _) = setup_market();
    let mut config = drop_config("drop-01");
    config.allowlist = Some(allowlist_of(&[buyer()], 5, 60_000, 0));
    let err = ledger.create_collection(&creator(), config).unwrap_err();
    assert!(matches!(err, MarketError::InvalidInput(_)));
}

#[test]
fn create_rejects_duplicate_id() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");
    let err = ledger
        .create_collection(&creator(), drop_config("drop-01"))
        .unwrap_err();
    assert!(matches!(err, MarketError::StateConflict(_)));
}

#[test]
fn allowlist_window_is_anchored_at_creation() {
    let (ledger, _) = setup_market();
    let mut config = drop_config("drop-01");
    config.allowlist = Some(allowlist_of(&[buyer()], 5, 60_000, 2));
    let collection = ledger.create_collection(&creator(), config).unwrap();
    let stage = collection.allowlist.unwrap();
    assert_eq!(stage.ends_at, NOW + 60_000);
    assert!(stage.is_active(NOW));
    assert!(!stage.is_active(NOW + 60_000));
}

// --- Creator configuration ---

#[test]
fn set_allowlist_requires_creator() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");
    let err = ledger
        .set_allowlist(
            &buyer(),
            &"drop-01".parse().unwrap(),
            allowlist_of(&[buyer()], 5, 60_000, 2),
        )
        .unwrap_err();
    assert!(matches!(err, MarketError::Unauthorized(_)));
}

#[test]
fn set_allowlist_restarts_window_from_now() {
    let (ledger, clock) = setup_market();
    create_drop(&ledger, "drop-01");
    clock.advance(10_000);
    let collection = ledger
        .set_allowlist(
            &creator(),
            &"drop-01".parse().unwrap(),
            allowlist_of(&[buyer()], 5, 60_000, 2),
        )
        .unwrap();
    assert_eq!(collection.allowlist.unwrap().ends_at, NOW + 10_000 + 60_000);
}

#[test]
fn update_public_price_requires_creator() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");
    let err = ledger
        .update_public_price(&buyer(), &"drop-01".parse().unwrap(), Amount(99))
        .unwrap_err();
    assert!(matches!(err, MarketError::Unauthorized(_)));

    ledger
        .update_public_price(&creator(), &"drop-01".parse().unwrap(), Amount(99))
        .unwrap();
    let collection = ledger.collection(&"drop-01".parse().unwrap()).unwrap();
    assert_eq!(collection.public_price, Amount(99));
}

#[test]
fn pause_and_resume_are_strict_transitions() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");
    let id = "drop-01".parse().unwrap();

    let err = ledger.resume_collection(&creator(), &id).unwrap_err();
    assert!(matches!(err, MarketError::StateConflict(_)));

    ledger.pause_collection(&creator(), &id).unwrap();
    let err = ledger.pause_collection(&creator(), &id).unwrap_err();
    assert!(matches!(err, MarketError::StateConflict(_)));

    ledger.resume_collection(&creator(), &id).unwrap();
    assert!(!ledger.collection(&id).unwrap().paused);
}

#[tokio::test]
async fn paused_collection_rejects_mints() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");
    let id = "drop-01".parse().unwrap();
    ledger.pause_collection(&creator(), &id).unwrap();

    let err = ledger.mint(&buyer(), &id, 1, Amount(10)).await.unwrap_err();
    assert!(matches!(
        err,
        MarketError::MintRejected(MintReject::NoActiveStage)
    ));
}

// --- Revenue withdrawal ---

#[tokio::test]
async fn withdraw_pays_creator_from_escrow() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");
    mint_one(&ledger, &buyer(), "drop-01").await;

    let withdrawn = ledger
        .withdraw_revenue(&creator(), &"drop-01".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(withdrawn, Amount(10));
    assert_eq!(ledger.authority().balance(&creator()), Amount(FUNDS + 10));
    assert_eq!(ledger.authority().escrow_total(), Amount::ZERO);
}

#[tokio::test]
async fn withdraw_requires_creator() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");
    mint_one(&ledger, &buyer(), "drop-01").await;

    let err = ledger
        .withdraw_revenue(&buyer(), &"drop-01".parse().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::Unauthorized(_)));
}

#[tokio::test]
async fn withdraw_with_nothing_accrued_conflicts() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");

    let err = ledger
        .withdraw_revenue(&creator(), &"drop-01".parse().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::StateConflict(_)));
}

#[tokio::test]
async fn failed_withdraw_rolls_back_the_claim() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");
    mint_one(&ledger, &buyer(), "drop-01").await;
    let id: mintbay_types::CollectionId = "drop-01".parse().unwrap();

    ledger.authority().fail_next(
        AuthorityOp::ReleaseEscrow,
        AuthorityError::Unavailable("settlement offline".into()),
    );
    let err = ledger.withdraw_revenue(&creator(), &id).await.unwrap_err();
    assert!(matches!(err, MarketError::Unavailable(_)));
    assert_eq!(ledger.collection(&id).unwrap().accrued(), Amount(10));

    // Retry succeeds once the authority is back.
    let withdrawn = ledger.withdraw_revenue(&creator(), &id).await.unwrap();
    assert_eq!(withdrawn, Amount(10));
    assert_eq!(ledger.collection(&id).unwrap().accrued(), Amount::ZERO);
}
