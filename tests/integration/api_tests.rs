//! API integration tests
//!
//! Run against a live server started with ADMIN_SECRET=admin:
//! cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const ADMIN_SECRET: &str = "admin";

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_track_visit() {
    let client = Client::new();

    let response = client
        .post(format!("{}/track", BASE_URL))
        .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
        .header("user-agent", "integration-test")
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["ok"], true);
}

#[tokio::test]
#[ignore]
async fn test_analytics_requires_secret() {
    let client = Client::new();

    let response = client
        .get(format!("{}/analytics", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_analytics_summary_shape() {
    let client = Client::new();

    // Record one visit so the summary has something in the window
    client
        .post(format!("{}/track", BASE_URL))
        .header("x-forwarded-for", "203.0.113.9")
        .send()
        .await
        .expect("Failed to send track request");

    let response = client
        .get(format!("{}/analytics?period=7", BASE_URL))
        .header("x-admin-secret", ADMIN_SECRET)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["total"].as_i64().expect("No total") >= 1);
    assert_eq!(body["period_days"], 7);
    assert_eq!(body["daily"].as_array().expect("No daily series").len(), 7);
    assert!(body["recent"].is_array());
    assert!(body["countries_all_time"].is_object());
}

#[tokio::test]
#[ignore]
async fn test_subscribe_and_unsubscribe() {
    let client = Client::new();

    let response = client
        .post(format!("{}/push/subscribe", BASE_URL))
        .json(&json!({
            "user": "integration-user",
            "subscription": {
                "endpoint": "https://push.example/integration",
                "keys": { "p256dh": "BDeadBeef", "auth": "c2VjcmV0" }
            }
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/push/unsubscribe", BASE_URL))
        .json(&json!({
            "user": "integration-user",
            "endpoint": "https://push.example/integration"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_broadcast_requires_title() {
    let client = Client::new();

    let response = client
        .post(format!("{}/push/broadcast", BASE_URL))
        .header("x-admin-secret", ADMIN_SECRET)
        .json(&json!({
            "users": ["integration-user"],
            "title": ""
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_backup_run_and_index() {
    let client = Client::new();

    let response = client
        .post(format!("{}/backup/run", BASE_URL))
        .header("x-admin-secret", ADMIN_SECRET)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let date = body["date"].as_str().expect("No date").to_string();

    let response = client
        .get(format!("{}/backup/snapshots", BASE_URL))
        .header("x-admin-secret", ADMIN_SECRET)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let index: Value = response.json().await.expect("Failed to parse response");
    let entries = index.as_array().expect("Index is not a list");
    assert_eq!(entries[0]["date"], date.as_str());

    let response = client
        .get(format!("{}/backup/snapshots/{}", BASE_URL, date))
        .header("x-admin-secret", ADMIN_SECRET)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_geo_batch_lookup() {
    let client = Client::new();

    let response = client
        .post(format!("{}/geo/lookup", BASE_URL))
        .header("x-admin-secret", ADMIN_SECRET)
        .json(&json!({ "addresses": ["203.0.113.9", "198.51.100.7"] }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body.as_array().expect("Not a list").len(), 2);
}

#[tokio::test]
#[ignore]
async fn test_unknown_snapshot_is_404() {
    let client = Client::new();

    let response = client
        .get(format!("{}/backup/snapshots/1999-01-01", BASE_URL))
        .header("x-admin-secret", ADMIN_SECRET)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}
