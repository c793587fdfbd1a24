use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tokio::signal;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use harvestarr_core::{
    load_config, validate_config, Harvester, MediaProvider, RegistryClient, SanitizedConfig,
    SonarrClient, YtDlpProvider,
};

#[derive(Parser, Debug)]
#[command(name = "harvestarr", version)]
#[command(about = "Fetches missing Sonarr episodes from video sites with yt-dlp")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "HARVESTARR_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Log at debug level
    #[arg(long, default_value_t = false)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Logging depends on the config's debug flag, so load first and report after.
    let loaded = load_config(&cli.config);
    init_tracing(cli.debug || loaded.as_ref().is_ok_and(|c| c.harvester.debug));

    info!("Loading configuration from {:?}", cli.config);
    let config = loaded.with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = SanitizedConfig::from(&config);
    info!(
        "Configuration loaded: registry {}, {} watched series, scanning every {} minutes",
        sanitized.registry.base_url,
        sanitized.series.len(),
        sanitized.harvester.scan_interval
    );
    debug!("Configuration: {:?}", sanitized);

    let registry: Arc<dyn RegistryClient> = Arc::new(
        SonarrClient::new(config.registry.clone()).context("Failed to create registry client")?,
    );
    let debug = cli.debug || config.harvester.debug;
    let provider: Arc<dyn MediaProvider> =
        Arc::new(YtDlpProvider::new(config.ytdl.clone()).with_verbose(debug));
    info!("Using {} at {:?}", provider.name(), config.ytdl.binary);

    let mut harvester = Harvester::new(&config, registry, provider, Utc::now());
    let scan_period = config.harvester.scan_period();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    info!("Initial run");
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            report = harvester.run_cycle() => debug!("Cycle report: {:?}", report),
        }

        info!("Next scan in {} minutes", config.harvester.scan_interval);
        tokio::select! {
            _ = &mut shutdown => break,
            _ = tokio::time::sleep(scan_period) => {}
        }
    }

    info!("Shutdown signal received, exiting");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
