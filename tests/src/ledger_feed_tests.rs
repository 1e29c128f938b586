use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;

use mintbay_gateway::content::HttpFetch;
use mintbay_gateway::endpoints::{EndpointResolver, HttpProbe};
use mintbay_gateway::ledger_client::LedgerAccessClient;
use mintbay_types::LedgerEvent;

use crate::utils::{execute, spawn_gateway, test_config, DEAD_ENDPOINT};

fn feed_client(endpoints: Vec<String>) -> LedgerAccessClient<HttpProbe, HttpFetch> {
    let client = reqwest::Client::new();
    let resolver = Arc::new(EndpointResolver::new(
        HttpProbe::new(client.clone()),
        endpoints,
        Vec::new(),
        Duration::from_millis(500),
    ));
    LedgerAccessClient::new(resolver, HttpFetch::new(client), Duration::from_millis(1_000))
}

async fn seed_collection(base: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let (status, body) = execute(
        &client,
        base,
        "creator",
        json!({
            "type": "create_collection",
            "id": "drop-one",
            "name": "Drop One",
            "symbol": "DROP",
            "max_supply": 10,
            "public_price": "5"
        }),
    )
    .await?;
    anyhow::ensure!(status == 200, "seed create failed: {body}");
    Ok(())
}

#[tokio::test]
async fn feed_reads_a_live_gateway() -> Result<()> {
    let (base, _state) = spawn_gateway(test_config()).await?;
    seed_collection(&base).await?;

    let feed = feed_client(vec![base.clone()]);
    assert_eq!(feed.head_seq().await?, 1);

    let events = feed.recent_events(10).await?;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].seq, 1);
    assert!(matches!(
        events[0].event,
        LedgerEvent::CollectionCreated { .. }
    ));
    Ok(())
}

#[tokio::test]
async fn feed_fails_over_past_a_dead_endpoint() -> Result<()> {
    let (base, _state) = spawn_gateway(test_config()).await?;
    seed_collection(&base).await?;

    // First candidate refuses connections; the probe walk lands on the
    // live gateway and reads from it.
    let feed = feed_client(vec![DEAD_ENDPOINT.to_string(), base.clone()]);
    assert_eq!(feed.head_seq().await?, 1);

    let events = feed.events_in(1, 1).await?;
    assert_eq!(events.len(), 1);
    Ok(())
}
