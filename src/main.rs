mod config;
mod logging;
mod ports;
mod services;
mod spotify_rs;
mod triplej_rs;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    logging::{init_tracing, setup_logging},
    services::{
        radio::client::TriplejHttpAdapter,
        reconciler::{Reconciler, log_outcome},
        spotify::client::SpotifyHttpAdapter,
    },
    spotify_rs::client::SpotifyClient,
    triplej_rs::client::TriplejClient,
};

const SERVICE_NAME: &str = "radio-playlist-sync";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "RADIO_PLAYLIST_SYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Console log level
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level
    #[arg(long, default_value = "debug", global = true)]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "RADIO_PLAYLIST_SYNC_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    /// OTLP gRPC endpoint to export tracing spans to
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT", global = true)]
    otlp_endpoint: Option<String>,

    /// Span filter used when exporting traces
    #[arg(long, default_value = "info", global = true, env = "TRACING_LEVEL")]
    tracing_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bring the playlist in line with the station's recent plays, once
    Sync,
    /// Keep syncing on a fixed interval until interrupted
    Watch {
        /// Time between sync passes, e.g. "90s" or "5m"
        #[arg(short, long, default_value = "5m", env = "SYNC_INTERVAL")]
        interval: humantime::Duration,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;
    let tracer_provider = init_tracing(
        SERVICE_NAME,
        args.otlp_endpoint.as_deref(),
        &args.tracing_level,
    )?;

    log::debug!("Radio playlist sync starting");
    let result = run(args).await;

    if let Some(tracer_provider) = tracer_provider {
        if let Err(e) = tracer_provider.shutdown() {
            log::warn!("Failed to flush traces: {}", e);
        }
    }

    result
}

type StationReconciler = Reconciler<TriplejHttpAdapter, SpotifyHttpAdapter, SpotifyHttpAdapter>;

async fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                log::debug!("Creating default config");
                let path = Config::create_default()?;
                log::info!("Default config written to {}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
        Commands::Sync => {
            let config = load_config(args.config)?;
            let reconciler = build_reconciler(&config);
            let cancel = cancel_on_ctrl_c();
            log::info!(
                "Syncing playlist {} with {} ({} tracks)",
                config.spotify.playlist_id,
                config.station,
                config.playlist_size
            );
            let outcome = reconciler
                .synchronize(config.playlist_size, &config.spotify.playlist_id, &cancel)
                .await
                .wrap_err("Sync pass failed")?;
            log_outcome(&outcome);
        }
        Commands::Watch { interval } => {
            let config = load_config(args.config)?;
            let reconciler = build_reconciler(&config);
            let cancel = cancel_on_ctrl_c();
            log::info!(
                "Syncing playlist {} with {} every {}",
                config.spotify.playlist_id,
                config.station,
                interval
            );
            reconciler
                .run_every(
                    interval.into(),
                    config.playlist_size,
                    &config.spotify.playlist_id,
                    &cancel,
                )
                .await;
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    log::debug!("Loading configuration");
    let config = if let Some(config) = path {
        Config::from_file(&config)
    } else {
        Config::load()
    };
    config.with_context(|| "Failed to load radio-playlist-sync config")
}

fn build_reconciler(config: &Config) -> StationReconciler {
    let spotify = SpotifyHttpAdapter::new(SpotifyClient::new(
        config.spotify_credentials(),
        config.spotify.market.clone(),
    ));
    Reconciler::new(
        TriplejHttpAdapter::new(TriplejClient::new(config.station.clone())),
        spotify.clone(),
        spotify,
    )
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("Interrupted, stopping after the current step");
                cancel.cancel();
            }
        }
    });
    cancel
}
