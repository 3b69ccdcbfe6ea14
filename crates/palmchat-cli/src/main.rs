//! palmchat - LAN API service for the on-device chat assistant.
//!
//! Composition root: loads the settings file, wires the inference engine
//! and tool collaborators into the supervisor, and runs until Ctrl-C.

#![deny(unsafe_code)]

mod settings_file;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use palmchat_axum::ServiceSupervisor;
use palmchat_core::ports::status_sink::StatusSink;
use palmchat_core::ports::tool::Tool;
use palmchat_core::settings::generate_token;
use palmchat_core::status::ServiceStatus;
use palmchat_llama::{LlamaServerConfig, LlamaServerEngine};
use palmchat_tools::{
    LocationTool, SearchTool, SearchToolConfig, StaticLocationProvider, TimeTool,
};

/// How often the settings file is checked for changes.
const SETTINGS_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "palmchat", version, about = "LAN API service for the on-device chat assistant")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API service against a live settings file
    Serve {
        /// Path to the JSON settings file (created with defaults if absent)
        #[arg(long, default_value = "palmchat-settings.json")]
        settings: PathBuf,

        /// Base URL of the OpenAI-compatible endpoint serving the model
        #[arg(long, default_value = "http://127.0.0.1:8080", env = "PALMCHAT_ENGINE_URL")]
        engine_url: String,

        /// Model identifier forwarded to the engine
        #[arg(long, default_value = "default")]
        model: String,

        /// Host advertised in status updates (e.g. the device's LAN address)
        #[arg(long, default_value = "0.0.0.0")]
        advertise: String,

        /// API key for the web-search tool
        #[arg(long, env = "PALMCHAT_SEARCH_API_KEY")]
        search_api_key: Option<String>,
    },
    /// Print a freshly generated API token
    Token,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Serve {
            settings,
            engine_url,
            model,
            advertise,
            search_api_key,
        } => serve(settings, engine_url, model, advertise, search_api_key).await,
        Commands::Token => {
            println!("{}", generate_token());
            Ok(())
        }
    }
}

async fn serve(
    settings_path: PathBuf,
    engine_url: String,
    model: String,
    advertise: String,
    search_api_key: Option<String>,
) -> anyhow::Result<()> {
    let initial = settings_file::load_or_init(&settings_path)
        .with_context(|| format!("loading {}", settings_path.display()))?;
    let (settings_rx, watcher) =
        settings_file::spawn_watcher(settings_path, initial, SETTINGS_POLL_INTERVAL);

    let engine = Arc::new(LlamaServerEngine::new(LlamaServerConfig {
        base_url: engine_url,
        model,
    }));

    let supervisor = ServiceSupervisor::new(engine, build_tools(search_api_key), Arc::new(LogStatusSink))
        .with_advertised_host(advertise);
    let supervisor_task = tokio::spawn(supervisor.run(settings_rx));

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    tracing::info!("Shutdown signal received");

    // Dropping the settings sender (by killing the watcher) ends the
    // supervisor's watch loop; it tears the instance down on the way out.
    watcher.abort();
    supervisor_task.await.context("supervisor task failed")?;

    Ok(())
}

fn build_tools(search_api_key: Option<String>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(TimeTool::new()) as Arc<dyn Tool>,
        // No portable positioning backend on a headless host; the tool
        // reports "location unavailable" until one is wired in.
        Arc::new(LocationTool::new(Arc::new(
            StaticLocationProvider::unavailable(),
        ))) as Arc<dyn Tool>,
        Arc::new(SearchTool::new(SearchToolConfig {
            api_key: search_api_key,
            ..Default::default()
        })) as Arc<dyn Tool>,
    ]
}

/// Status sink that mirrors the persistent notification of the phone app:
/// one log line per reachability change.
struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn publish(&self, status: ServiceStatus) {
        match &status {
            ServiceStatus::Active { host, port } => {
                tracing::info!(%host, port = *port, "LAN API active at http://{host}:{port}");
            }
            ServiceStatus::Inactive => tracing::info!("LAN API inactive"),
            ServiceStatus::Failed { reason } => {
                tracing::error!(reason = %reason, "LAN API failed to start");
            }
        }
    }
}
