mod config;
mod protocol;
mod server;
mod storage;
mod store;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use config::{Config, LogConfig};
use server::Server;
use store::JokeStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Joke collection service for chat bots
#[derive(Parser, Debug)]
#[command(name = "jokebox", version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Listening port, overrides the config file and $PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// JSON file the jokes are persisted to
    #[arg(long)]
    jokes_file: Option<PathBuf>,
}

fn init_logging(log: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    match &log.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.init(),
    }
    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_env()?;

    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(jokes_file) = &args.jokes_file {
        config.jokes_file = jokes_file.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_logging(&config.log)?;

    info!("Starting jokebox");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(JokeStore::open(&config.jokes_file, config.submissions_open));
    if store.is_empty() {
        info!("Joke list is empty");
    } else {
        info!("{} jokes available", store.len());
    }
    let server = Server::start(&config, store)
        .await
        .with_context(|| format!("Failed to bind {}", config.server_addr()))?;
    info!("Server is running on port {}", server.local_addr().port());

    server.run().await?;
    Ok(())
}
