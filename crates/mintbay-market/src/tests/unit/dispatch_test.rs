use mintbay_types::Amount;
use serde_json::json;

use crate::tests::test_utils::*;
use crate::*;

// --- Wire format ---

#[test]
fn actions_parse_from_tagged_json() {
    let action: Action = serde_json::from_value(json!({
        "type": "mint",
        "collection_id": "drop-01",
        "quantity": 2,
        "payment": "20"
    }))
    .unwrap();
    assert_eq!(
        action,
        Action::Mint {
            collection_id: "drop-01".parse().unwrap(),
            quantity: 2,
            payment: Amount(20)
        }
    );
    assert_eq!(action.kind(), "mint");
}

#[test]
fn create_collection_flattens_config() {
    let action: Action = serde_json::from_value(json!({
        "type": "create_collection",
        "id": "drop-01",
        "name": "Test Drop",
        "symbol": "DROP",
        "max_supply": 100,
        "public_price": "10"
    }))
    .unwrap();
    let Action::CreateCollection { config } = action else {
        panic!("wrong variant");
    };
    assert_eq!(config.max_supply, 100);
    assert_eq!(config.public_price, Amount(10));
    assert!(config.allowlist.is_none());
}

#[test]
fn set_allowlist_flattens_stage_parameters() {
    let action: Action = serde_json::from_value(json!({
        "type": "set_allowlist",
        "collection_id": "drop-01",
        "price": "5",
        "duration_ms": 60000,
        "member_quota": 2,
        "members": ["buyer"]
    }))
    .unwrap();
    let Action::SetAllowlist { allowlist, .. } = action else {
        panic!("wrong variant");
    };
    assert_eq!(allowlist.price, Amount(5));
    assert_eq!(allowlist.members, vec![buyer()]);
}

#[test]
fn unknown_action_type_is_rejected() {
    let parsed = serde_json::from_value::<Action>(json!({ "type": "steal_tokens" }));
    assert!(parsed.is_err());
}

// --- Routing ---

#[tokio::test]
async fn execute_routes_collection_lifecycle() {
    let (ledger, _) = setup_market();

    let result = ledger
        .execute(
            &creator(),
            Action::CreateCollection {
                config: drop_config("drop-01"),
            },
        )
        .await
        .unwrap();
    assert_eq!(result["id"], "drop-01");

    let result = ledger
        .execute(
            &creator(),
            Action::PauseCollection {
                collection_id: "drop-01".parse().unwrap(),
            },
        )
        .await
        .unwrap();
    assert_eq!(result, json!({ "paused": true }));
}

#[tokio::test]
async fn execute_routes_trading_flow() {
    let (ledger, _) = setup_market();
    create_drop(&ledger, "drop-01");

    let result = ledger
        .execute(
            &buyer(),
            Action::Mint {
                collection_id: "drop-01".parse().unwrap(),
                quantity: 1,
                payment: Amount(10),
            },
        )
        .await
        .unwrap();
    assert_eq!(result["token_ids"], json!(["drop-01:1"]));

    let result = ledger
        .execute(
            &buyer(),
            Action::ListToken {
                token_id: token("drop-01:1"),
                price: Amount(25),
            },
        )
        .await
        .unwrap();
    assert_eq!(result["id"], 1);

    let result = ledger
        .execute(
            &bidder(),
            Action::Buy {
                listing_id: mintbay_types::ListingId(1),
                payment: Amount(25),
            },
        )
        .await
        .unwrap();
    assert_eq!(result["via"], "listing");
    assert_eq!(result["price"], "25");

    let result = ledger
        .execute(
            &creator(),
            Action::WithdrawRevenue {
                collection_id: "drop-01".parse().unwrap(),
            },
        )
        .await
        .unwrap();
    assert_eq!(result, json!({ "withdrawn": "10" }));
}

#[tokio::test]
async fn execute_surfaces_operation_errors() {
    let (ledger, _) = setup_market();
    let err = ledger
        .execute(
            &buyer(),
            Action::Mint {
                collection_id: "ghost".parse().unwrap(),
                quantity: 1,
                payment: Amount(10),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::NotFound(_)));
}
