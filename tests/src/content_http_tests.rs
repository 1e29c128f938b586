use anyhow::Result;
use serde_json::Value;

use mintbay_gateway::content::PLACEHOLDER_PNG;

use crate::utils::{spawn_gateway, test_config};

#[tokio::test]
async fn data_uri_json_decodes_over_http() -> Result<()> {
    let (base, _state) = spawn_gateway(test_config()).await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!(
            "{base}/content/data:application/json;base64,eyJhIjoxfQ==?kind=json"
        ))
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["a"], 1);
    Ok(())
}

#[tokio::test]
async fn missing_binary_content_serves_the_placeholder() -> Result<()> {
    let (base, _state) = spawn_gateway(test_config()).await?;
    let client = reqwest::Client::new();

    // Every configured gateway refuses connections, so the walk exhausts.
    let response = client
        .get(format!("{base}/content/QmMissingCid?kind=binary"))
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("image/png")
    );
    let bytes = response.bytes().await?;
    assert_eq!(bytes.as_ref(), PLACEHOLDER_PNG);
    Ok(())
}

#[tokio::test]
async fn missing_json_content_serves_an_error_document() -> Result<()> {
    let (base, _state) = spawn_gateway(test_config()).await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base}/content/QmMissingCid?kind=json"))
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "content unavailable");
    Ok(())
}

#[tokio::test]
async fn request_id_is_echoed() -> Result<()> {
    let (base, _state) = spawn_gateway(test_config()).await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base}/health"))
        .header("x-request-id", "trace-me-123")
        .send()
        .await?;
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("trace-me-123")
    );

    // Without a caller id the gateway mints one.
    let response = client.get(format!("{base}/health")).send().await?;
    let minted = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(minted.starts_with("gw-"), "got {minted:?}");
    Ok(())
}
