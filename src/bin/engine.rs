use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, level_filters::LevelFilter, trace, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use vigil::{
    api::{ApiConfig, ApiState, spawn_api_server},
    config::{Config, StorageConfig, read_config_file},
    email::{EmailTransport, HttpMailer},
    engine::Engine,
    storage::{TargetStore, memory::MemoryStore},
    util,
};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short)]
    file: String,
}

fn init() {
    let filter = filter::Targets::new().with_targets(vec![
        ("vigil", LevelFilter::TRACE),
        ("vigil_engine", LevelFilter::TRACE),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init();

    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = read_config_file(&args.file)?;

    let store = build_store(&config).await?;

    let transport: Option<Arc<dyn EmailTransport>> = config
        .email
        .as_ref()
        .map(|email| Arc::new(HttpMailer::new(email)) as Arc<dyn EmailTransport>);
    if transport.is_none() {
        warn!("no email transport configured, alert dispatch disabled");
    }

    let engine = Arc::new(Engine::new(store, transport, config.monitor.clone())?);

    let secret = config
        .trigger
        .secret
        .clone()
        .or_else(util::get_secret)
        .context("no trigger secret configured (set trigger.secret or MONITOR_SECRET)")?;

    let bind_addr = SocketAddr::from((util::get_addr(), util::get_port()));
    let addr = spawn_api_server(
        ApiConfig {
            bind_addr,
            trigger_secret: secret,
        },
        ApiState::new(engine),
    )
    .await?;

    info!("trigger endpoint ready at http://{addr}/api/monitor");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    Ok(())
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn TargetStore>> {
    match config.storage.clone().unwrap_or_default() {
        StorageConfig::None => {
            warn!("using in-memory store, target state is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }

        #[cfg(feature = "storage-sqlite")]
        StorageConfig::Sqlite { path } => {
            let store = vigil::storage::sqlite::SqliteStore::new(path).await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-sqlite"))]
        StorageConfig::Sqlite { .. } => {
            anyhow::bail!("sqlite storage requested but the storage-sqlite feature is disabled")
        }
    }
}
