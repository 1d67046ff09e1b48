//! Fluzio daemon: entry point for running the proof engine.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use fluzio_node::{
    init_logging, spawn_sweeper, EngineConfig, HttpReviewProbe, LogFormat, ProofEngine,
    ShutdownCause, ShutdownController,
};
use fluzio_rpc::RpcServer;
use fluzio_store_memory::MemoryStore;
use fluzio_types::{Clock, SystemClock};

#[derive(Parser)]
#[command(name = "fluzio-daemon", about = "Fluzio proof validation and reward release engine")]
struct Cli {
    /// Path to a TOML configuration file. CLI flags and env vars override it.
    #[arg(long, env = "FLUZIO_CONFIG")]
    config: Option<PathBuf>,

    /// RPC server port.
    #[arg(long, env = "FLUZIO_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "FLUZIO_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "FLUZIO_LOG_FORMAT")]
    log_format: Option<String>,

    /// JSON snapshot restored on start and written on shutdown.
    #[arg(long, env = "FLUZIO_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Disable the Prometheus metrics endpoint.
    #[arg(long, env = "FLUZIO_DISABLE_METRICS")]
    disable_metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the engine until SIGINT/SIGTERM.
    Run,
    /// Load and validate the configuration, then exit.
    CheckConfig,
}

fn load_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_toml_file(&path.to_string_lossy())
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(port) = cli.rpc_port {
        config.rpc_port = port;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    if cli.snapshot.is_some() {
        config.snapshot_path = cli.snapshot.clone();
    }
    if cli.disable_metrics {
        config.enable_metrics = false;
    }
    config.validate()?;
    Ok(config)
}

async fn run(config: EngineConfig) -> anyhow::Result<()> {
    let store = match &config.snapshot_path {
        Some(path) => MemoryStore::load_or_default(path)
            .with_context(|| format!("restoring {}", path.display()))?,
        None => MemoryStore::new(),
    };
    let store = Arc::new(store);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let mut engine = ProofEngine::new(store.clone(), clock, &config)?;
    if let Some(review_api) = &config.review_api {
        engine = engine.with_probe(Arc::new(HttpReviewProbe::new(review_api)?));
        tracing::info!(base_url = %review_api.base_url, "external review polling enabled");
    }
    let engine = Arc::new(engine);

    let shutdown = ShutdownController::new();
    let sweeper = spawn_sweeper(
        engine.clone(),
        Duration::from_secs(config.sweep_interval_secs),
        shutdown.subscribe(),
    );
    let server = RpcServer::new(config.rpc_port, config.enable_metrics);
    let rpc_engine = engine.clone();
    let rpc_shutdown = shutdown.subscribe();
    let rpc_controller = shutdown.clone();
    let rpc = tokio::spawn(async move {
        let served = server.serve(rpc_engine, rpc_shutdown).await;
        // Stop the sweeper too if the server died on its own.
        rpc_controller.shutdown(ShutdownCause::Fault("rpc server"));
        served
    });

    tracing::info!(
        rpc_port = config.rpc_port,
        missions = config.missions.len(),
        sweep_interval_secs = config.sweep_interval_secs,
        "Fluzio engine started"
    );

    let cause = shutdown.wait_for_signal().await;
    tracing::info!(%cause, "Shutdown signal received, stopping engine");

    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "sweeper task ended abnormally");
    }
    match rpc.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "RPC server failed"),
        Err(e) => tracing::warn!(error = %e, "RPC task ended abnormally"),
    }

    if let Some(path) = &config.snapshot_path {
        store
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    tracing::info!("Fluzio daemon exited cleanly");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let format: LogFormat = config
        .log_format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    init_logging(format, &config.log_level)?;

    match cli.command {
        Command::Run => run(config).await,
        Command::CheckConfig => {
            tracing::info!(
                missions = config.missions.len(),
                providers = config.providers.len(),
                businesses = config.businesses.len(),
                "configuration is valid"
            );
            Ok(())
        }
    }
}
