use std::collections::BTreeSet;

use mintbay_types::Amount;

use crate::tests::test_utils::*;
use crate::*;

fn base_collection(supply: u32) -> Collection {
    Collection {
        id: "drop".parse().unwrap(),
        creator: creator(),
        name: "Drop".into(),
        symbol: "DROP".into(),
        max_supply: supply,
        supply: 0,
        next_index: 0,
        public_price: Amount(10),
        wallet_quota: None,
        allowlist: None,
        opens_at: None,
        closes_at: None,
        paused: false,
        metadata: None,
        total_revenue: Amount::ZERO,
        withdrawn: Amount::ZERO,
        created_at: NOW,
    }
}

fn with_stage(mut collection: Collection, price: u128, ends_at: u64, quota: u32) -> Collection {
    collection.allowlist = Some(AllowlistStage {
        price: Amount(price),
        ends_at,
        member_quota: quota,
        members: BTreeSet::from([buyer()]),
    });
    collection
}

// --- Stage selection ---

#[test]
fn open_edition_quotes_public_price() {
    let collection = base_collection(100);
    let quote = evaluate_mint(&collection, &buyer(), 1, 0, NOW).unwrap();
    assert_eq!(quote.stage, StageKind::Public);
    assert_eq!(quote.unit_price, Amount(10));
}

#[test]
fn member_quotes_allowlist_price_while_window_open() {
    let collection = with_stage(base_collection(100), 5, NOW + 1_000, 2);
    let quote = evaluate_mint(&collection, &buyer(), 1, 0, NOW).unwrap();
    assert_eq!(quote.stage, StageKind::Allowlist);
    assert_eq!(quote.unit_price, Amount(5));
}

#[test]
fn nonmember_falls_through_to_public() {
    let collection = with_stage(base_collection(100), 5, NOW + 1_000, 2);
    let quote = evaluate_mint(&collection, &bidder(), 1, 0, NOW).unwrap();
    assert_eq!(quote.stage, StageKind::Public);
    assert_eq!(quote.unit_price, Amount(10));
}

#[test]
fn member_falls_to_public_after_window_closes() {
    let collection = with_stage(base_collection(100), 5, NOW + 1_000, 2);
    let quote = evaluate_mint(&collection, &buyer(), 1, 0, NOW + 1_000).unwrap();
    assert_eq!(quote.stage, StageKind::Public);
}

#[test]
fn zero_duration_window_is_never_active() {
    let collection = with_stage(base_collection(100), 5, NOW, 2);
    let quote = evaluate_mint(&collection, &buyer(), 1, 0, NOW).unwrap();
    assert_eq!(quote.stage, StageKind::Public);
}

// --- Sold out wins over everything ---

#[test]
fn sold_out_beats_pause_and_membership() {
    let mut collection = with_stage(base_collection(5), 5, NOW + 1_000, 2);
    collection.supply = 5;
    collection.paused = true;
    let err = evaluate_mint(&collection, &buyer(), 1, 0, NOW).unwrap_err();
    assert_eq!(err, MintReject::SoldOut);
}

// --- Schedule gates ---

#[test]
fn paused_collection_has_no_active_stage() {
    let mut collection = base_collection(100);
    collection.paused = true;
    let err = evaluate_mint(&collection, &buyer(), 1, 0, NOW).unwrap_err();
    assert_eq!(err, MintReject::NoActiveStage);
}

#[test]
fn close_time_is_inclusive() {
    let mut collection = base_collection(100);
    collection.closes_at = Some(NOW);
    assert!(evaluate_mint(&collection, &buyer(), 1, 0, NOW).is_ok());
    let err = evaluate_mint(&collection, &buyer(), 1, 0, NOW + 1).unwrap_err();
    assert_eq!(err, MintReject::NoActiveStage);
}

#[test]
fn nonmember_before_open_with_live_window_is_not_allowlisted() {
    let mut collection = with_stage(base_collection(100), 5, NOW + 5_000, 2);
    collection.opens_at = Some(NOW + 5_000);
    let err = evaluate_mint(&collection, &bidder(), 1, 0, NOW).unwrap_err();
    assert_eq!(err, MintReject::NotAllowlisted);
}

#[test]
fn before_open_without_window_is_no_active_stage() {
    let mut collection = base_collection(100);
    collection.opens_at = Some(NOW + 5_000);
    let err = evaluate_mint(&collection, &buyer(), 1, 0, NOW).unwrap_err();
    assert_eq!(err, MintReject::NoActiveStage);
}

#[test]
fn member_mints_before_public_open() {
    let mut collection = with_stage(base_collection(100), 5, NOW + 5_000, 2);
    collection.opens_at = Some(NOW + 5_000);
    let quote = evaluate_mint(&collection, &buyer(), 1, 0, NOW).unwrap();
    assert_eq!(quote.stage, StageKind::Allowlist);
}

// --- Supply and quota ---

#[test]
fn public_supply_exceeded_reports_remaining() {
    let mut collection = base_collection(100);
    collection.supply = 99;
    let err = evaluate_mint(&collection, &buyer(), 2, 0, NOW).unwrap_err();
    assert_eq!(
        err,
        MintReject::SupplyExceeded {
            remaining: 1,
            requested: 2
        }
    );
}

#[test]
fn public_wallet_quota_enforced() {
    let mut collection = base_collection(100);
    collection.wallet_quota = Some(3);
    let err = evaluate_mint(&collection, &buyer(), 2, 2, NOW).unwrap_err();
    assert_eq!(
        err,
        MintReject::QuotaExceeded {
            minted: 2,
            requested: 2,
            quota: 3
        }
    );
    assert!(evaluate_mint(&collection, &buyer(), 1, 2, NOW).is_ok());
}

#[test]
fn member_quota_does_not_fall_through_to_public() {
    // Member with an exhausted allowlist quota is rejected outright, even
    // though the public stage would have allowed the mint.
    let collection = with_stage(base_collection(100), 5, NOW + 1_000, 1);
    let err = evaluate_mint(&collection, &buyer(), 1, 1, NOW).unwrap_err();
    assert_eq!(
        err,
        MintReject::QuotaExceeded {
            minted: 1,
            requested: 1,
            quota: 1
        }
    );
}

#[test]
fn member_supply_check_precedes_quota() {
    let mut collection = with_stage(base_collection(10), 5, NOW + 1_000, 10);
    collection.supply = 9;
    let err = evaluate_mint(&collection, &buyer(), 2, 0, NOW).unwrap_err();
    assert_eq!(
        err,
        MintReject::SupplyExceeded {
            remaining: 1,
            requested: 2
        }
    );
}
