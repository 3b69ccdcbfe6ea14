//! Shared test fixtures: a scripted engine, a recording status sink, and
//! a supervisor harness driven through a real watch channel.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use palmchat_axum::ServiceSupervisor;
use palmchat_core::domain::chat::ConversationMessage;
use palmchat_core::domain::sampling::SamplingConfig;
use palmchat_core::ports::engine::{
    EngineEvent, EngineEventReceiver, InferenceEngine, InferenceError, ToolSpec,
};
use palmchat_core::ports::status_sink::StatusSink;
use palmchat_core::settings::ApiSettings;
use palmchat_core::status::ServiceStatus;

/// Engine that replies with fixed chunks (optionally slowly) or fails,
/// counting every `generate` call.
#[derive(Debug)]
pub struct TestEngine {
    chunks: Vec<String>,
    delay: Duration,
    fail: bool,
    calls: AtomicUsize,
}

impl TestEngine {
    pub fn replying(chunks: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            chunks: chunks.iter().map(ToString::to_string).collect(),
            delay: Duration::ZERO,
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn slow(chunks: &[&str], delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            chunks: chunks.iter().map(ToString::to_string).collect(),
            delay,
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            chunks: Vec::new(),
            delay: Duration::ZERO,
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceEngine for TestEngine {
    async fn generate(
        &self,
        _conversation: &[ConversationMessage],
        _tools: &[ToolSpec],
        _sampling: &SamplingConfig,
    ) -> Result<EngineEventReceiver, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(InferenceError::Unavailable("engine offline".into()));
        }

        let (tx, rx) = mpsc::channel(64);
        let chunks = self.chunks.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            for chunk in chunks {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if tx.send(Ok(EngineEvent::Delta(chunk))).await.is_err() {
                    return;
                }
            }
            let _ = tx.send(Ok(EngineEvent::Done)).await;
        });
        Ok(rx)
    }

    fn supports_concurrent_calls(&self) -> bool {
        true
    }
}

/// Status sink that forwards every update to the test.
pub struct RecordingStatusSink {
    tx: mpsc::UnboundedSender<ServiceStatus>,
}

impl StatusSink for RecordingStatusSink {
    fn publish(&self, status: ServiceStatus) {
        let _ = self.tx.send(status);
    }
}

/// A supervisor running against a real watch channel.
pub struct Harness {
    pub settings_tx: watch::Sender<ApiSettings>,
    pub status_rx: mpsc::UnboundedReceiver<ServiceStatus>,
    _task: JoinHandle<()>,
}

/// Spawn a supervisor for `settings`, returning the knobs the tests drive.
pub fn spawn_supervisor(engine: Arc<dyn InferenceEngine>, settings: ApiSettings) -> Harness {
    let (status_tx, status_rx) = mpsc::unbounded_channel();
    let sink = Arc::new(RecordingStatusSink { tx: status_tx });
    let (settings_tx, settings_rx) = watch::channel(settings);

    let supervisor = ServiceSupervisor::new(engine, Vec::new(), sink);
    let task = tokio::spawn(supervisor.run(settings_rx));

    Harness {
        settings_tx,
        status_rx,
        _task: task,
    }
}

/// Settings snapshot for tests: normal surface on, ephemeral port.
pub fn test_settings(token: &str) -> ApiSettings {
    let mut settings = ApiSettings::with_defaults();
    settings.server_port = 0;
    settings.local_api_token = token.to_string();
    settings
}

/// Next status update, or panic after a generous timeout.
pub async fn next_status(rx: &mut mpsc::UnboundedReceiver<ServiceStatus>) -> ServiceStatus {
    tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("timed out waiting for a status update")
        .expect("status channel closed")
}

/// Skip forward until the service reports active; returns the bound port.
pub async fn wait_for_active(rx: &mut mpsc::UnboundedReceiver<ServiceStatus>) -> u16 {
    loop {
        if let ServiceStatus::Active { port, .. } = next_status(rx).await {
            return port;
        }
    }
}

/// Skip forward until the service reports active on `port`.
pub async fn wait_for_active_on(rx: &mut mpsc::UnboundedReceiver<ServiceStatus>, port: u16) {
    loop {
        if let ServiceStatus::Active { port: active, .. } = next_status(rx).await {
            if active == port {
                return;
            }
        }
    }
}

/// A port nothing should be listening on once the service released it.
pub async fn port_refused(port: u16) -> bool {
    tokio::net::TcpStream::connect(("127.0.0.1", port))
        .await
        .is_err()
}

/// Reserve-then-release an ephemeral port for tests that need a fixed one.
pub async fn free_port() -> u16 {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
        .await
        .expect("failed to reserve a port");
    listener.local_addr().expect("no local addr").port()
}

pub fn base_url(port: u16) -> String {
    format!("http://127.0.0.1:{port}")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
