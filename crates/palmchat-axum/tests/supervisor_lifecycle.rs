//! Supervisor lifecycle: restart-on-change, coalescing, bind failures,
//! and the at-most-one-listener invariant.

mod common;

use std::time::Duration;

use common::{
    base_url, bearer, free_port, next_status, port_refused, spawn_supervisor, test_settings,
    wait_for_active, wait_for_active_on, TestEngine,
};
use palmchat_core::status::ServiceStatus;

#[tokio::test]
async fn test_disable_releases_socket_and_reenable_rebinds() {
    let engine = TestEngine::replying(&["hi"]);
    let mut settings = test_settings("tok");
    let mut harness = spawn_supervisor(engine, settings.clone());

    let port = wait_for_active(&mut harness.status_rx).await;
    let response = reqwest::get(format!("{}/health", base_url(port))).await.unwrap();
    assert_eq!(response.status(), 200);

    // Disable both surfaces: no listening socket may remain.
    settings.normal_api_enabled = false;
    settings.weird_api_enabled = false;
    harness.settings_tx.send(settings.clone()).unwrap();
    loop {
        if next_status(&mut harness.status_rx).await == ServiceStatus::Inactive {
            break;
        }
    }
    assert!(port_refused(port).await, "socket still bound after disable");

    // Re-enable: a listener exists again within the status round-trip.
    settings.normal_api_enabled = true;
    harness.settings_tx.send(settings).unwrap();
    let port = wait_for_active(&mut harness.status_rx).await;
    let response = reqwest::get(format!("{}/health", base_url(port))).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_port_change_moves_the_listener() {
    let engine = TestEngine::replying(&["hi"]);
    let first = free_port().await;
    let second = free_port().await;
    assert_ne!(first, second);

    let mut settings = test_settings("tok");
    settings.server_port = first;
    let mut harness = spawn_supervisor(engine, settings.clone());
    wait_for_active_on(&mut harness.status_rx, first).await;

    settings.server_port = second;
    harness.settings_tx.send(settings).unwrap();
    wait_for_active_on(&mut harness.status_rx, second).await;

    assert!(port_refused(first).await, "old port still bound");
    let response = reqwest::get(format!("{}/health", base_url(second))).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_rapid_fire_changes_coalesce_to_the_latest() {
    let engine = TestEngine::replying(&["hi"]);
    let mut ports = Vec::new();
    for _ in 0..4 {
        ports.push(free_port().await);
    }

    let mut settings = test_settings("tok");
    settings.server_port = ports[0];
    let mut harness = spawn_supervisor(engine, settings.clone());

    // Burst of changes, no waiting in between: only the newest matters.
    for &port in &ports[1..] {
        settings.server_port = port;
        harness.settings_tx.send(settings.clone()).unwrap();
    }

    let last = *ports.last().unwrap();
    wait_for_active_on(&mut harness.status_rx, last).await;

    let response = reqwest::get(format!("{}/health", base_url(last))).await.unwrap();
    assert_eq!(response.status(), 200);

    // At most one instance: every superseded port is unbound.
    for &port in &ports[..ports.len() - 1] {
        assert!(port_refused(port).await, "stale listener on {port}");
    }
}

#[tokio::test]
async fn test_bind_failure_leaves_supervisor_alive() {
    // Hold the port the supervisor will want.
    let blocker = tokio::net::TcpListener::bind(("0.0.0.0", 0)).await.unwrap();
    let blocked_port = blocker.local_addr().unwrap().port();

    let engine = TestEngine::replying(&["hi"]);
    let mut settings = test_settings("tok");
    settings.server_port = blocked_port;
    let mut harness = spawn_supervisor(engine, settings.clone());

    loop {
        if let ServiceStatus::Failed { reason } = next_status(&mut harness.status_rx).await {
            assert!(!reason.is_empty());
            break;
        }
    }

    // The process did not crash: a good snapshot recovers.
    settings.server_port = 0;
    harness.settings_tx.send(settings).unwrap();
    let port = wait_for_active(&mut harness.status_rx).await;
    let response = reqwest::get(format!("{}/health", base_url(port))).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_token_rotation_spares_inflight_stream() {
    // Five increments, 100ms apart: the stream outlives the rotation.
    let engine = TestEngine::slow(&["a", "b", "c", "d", "e"], Duration::from_millis(100));
    let port = free_port().await;
    let mut settings = test_settings("old-token");
    settings.server_port = port;
    let mut harness = spawn_supervisor(engine, settings.clone());
    wait_for_active_on(&mut harness.status_rx, port).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/v1/chat", base_url(port)))
        .header("Authorization", bearer("old-token"))
        .json(&serde_json::json!({
            "messages": [{"role": "user", "content": "hi"}],
            "stream": true
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Rotate the token while the stream is in flight.
    settings.local_api_token = "new-token".to_string();
    harness.settings_tx.send(settings).unwrap();

    // The in-flight stream completes on the draining instance.
    let body = response.text().await.unwrap();
    let streamed: String = body
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .filter_map(|data| serde_json::from_str::<serde_json::Value>(data).ok())
        .filter_map(|frame| frame["content"].as_str().map(ToString::to_string))
        .collect();
    assert_eq!(streamed, "abcde");

    // After the rebuild, the old token is dead and the new one works.
    wait_for_active_on(&mut harness.status_rx, port).await;
    let request = serde_json::json!({"messages": [{"role": "user", "content": "hi"}]});

    let response = client
        .post(format!("{}/v1/chat", base_url(port)))
        .header("Authorization", bearer("old-token"))
        .json(&request)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = client
        .post(format!("{}/v1/chat", base_url(port)))
        .header("Authorization", bearer("new-token"))
        .json(&request)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_identical_snapshot_does_not_restart() {
    let engine = TestEngine::replying(&["hi"]);
    let port = free_port().await;
    let mut settings = test_settings("tok");
    settings.server_port = port;
    let mut harness = spawn_supervisor(engine, settings.clone());
    wait_for_active_on(&mut harness.status_rx, port).await;

    // Re-emitting the same value must not bounce the listener.
    harness.settings_tx.send(settings).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(
        harness.status_rx.try_recv().is_err(),
        "unchanged snapshot caused a restart"
    );
    let response = reqwest::get(format!("{}/health", base_url(port))).await.unwrap();
    assert_eq!(response.status(), 200);
}
