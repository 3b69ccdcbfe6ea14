//! Authentication and surface-gating behavior.
//!
//! Verifies that:
//! - `/health` is reachable without authentication
//! - gated routes reject missing/wrong/malformed tokens with an empty 401
//! - auth failure triggers no inference work
//! - a disabled surface's paths do not exist at all

mod common;

use common::{
    base_url, bearer, spawn_supervisor, test_settings, wait_for_active, TestEngine,
};

#[tokio::test]
async fn test_health_needs_no_auth() {
    let engine = TestEngine::replying(&["hi"]);
    let mut harness = spawn_supervisor(engine, test_settings("abc123"));
    let port = wait_for_active(&mut harness.status_rx).await;

    let response = reqwest::get(format!("{}/health", base_url(port)))
        .await
        .expect("request failed");
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_chat_rejects_bad_credentials_without_inference() {
    let engine = TestEngine::replying(&["hi"]);
    let mut harness = spawn_supervisor(engine.clone(), test_settings("abc123"));
    let port = wait_for_active(&mut harness.status_rx).await;

    let client = reqwest::Client::new();
    let url = format!("{}/v1/chat", base_url(port));
    let body = serde_json::json!({"messages":[{"role":"user","content":"hi"}]});

    // Missing header
    let response = client.post(&url).json(&body).send().await.unwrap();
    assert_eq!(response.status(), 401);
    assert!(response.text().await.unwrap().is_empty());

    // Wrong token
    let response = client
        .post(&url)
        .header("Authorization", bearer("wrong"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // Wrong scheme / missing prefix
    for header in ["abc123", "Basic abc123"] {
        let response = client
            .post(&url)
            .header("Authorization", header)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 401);
    }

    // Auth failures were side-effect-free.
    assert_eq!(engine.calls(), 0);

    // The correct token goes through.
    let response = client
        .post(&url)
        .header("Authorization", bearer("abc123"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(engine.calls(), 1);
}

#[tokio::test]
async fn test_speech_answers_not_implemented() {
    let engine = TestEngine::replying(&["hi"]);
    let mut harness = spawn_supervisor(engine, test_settings("abc123"));
    let port = wait_for_active(&mut harness.status_rx).await;

    let response = reqwest::Client::new()
        .post(format!("{}/v1/speech", base_url(port)))
        .header("Authorization", bearer("abc123"))
        .json(&serde_json::json!({"text": "read this aloud"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 501);
}

#[tokio::test]
async fn test_events_gated_by_weird_surface() {
    let engine = TestEngine::replying(&["hi"]);
    let mut settings = test_settings("abc123");
    settings.weird_api_enabled = true;
    let mut harness = spawn_supervisor(engine, settings.clone());
    let port = wait_for_active(&mut harness.status_rx).await;

    let client = reqwest::Client::new();

    // Enabled: present but not implemented.
    let response = client
        .get(format!("{}/events", base_url(port)))
        .header("Authorization", bearer("abc123"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 501);

    // Disabled: the path does not exist.
    settings.weird_api_enabled = false;
    harness.settings_tx.send(settings).unwrap();
    let port = wait_for_active(&mut harness.status_rx).await;

    let response = client
        .get(format!("{}/events", base_url(port)))
        .header("Authorization", bearer("abc123"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_disabled_normal_surface_has_no_chat_route() {
    let engine = TestEngine::replying(&["hi"]);
    let mut settings = test_settings("abc123");
    settings.normal_api_enabled = false;
    settings.weird_api_enabled = true;
    let mut harness = spawn_supervisor(engine, settings);
    let port = wait_for_active(&mut harness.status_rx).await;

    let response = reqwest::Client::new()
        .post(format!("{}/v1/chat", base_url(port)))
        .header("Authorization", bearer("abc123"))
        .json(&serde_json::json!({"messages":[{"role":"user","content":"hi"}]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}
