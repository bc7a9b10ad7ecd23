//! Turnstile - credential and access-token gate

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turnstile::{
    auth::TokenCodec,
    config::Args,
    db::{MemoryStore, SqliteStore},
    server::{self, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("turnstile={},info", log_level).into()),
        )
        .with(args.log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!args.log_json).then(tracing_subscriber::fmt::layer))
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let codec = match TokenCodec::new(args.jwt_secret.as_deref().unwrap_or_default()) {
        Ok(codec) => codec,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!("======================================");
    info!("  Turnstile v{}", env!("CARGO_PKG_VERSION"));
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Store: {}", args.store_description());
    info!("======================================");

    let state = if args.memory_store {
        warn!("In-memory store enabled - principals are lost on restart");
        AppState::new(args, Arc::new(MemoryStore::new()), codec)
    } else {
        let store = SqliteStore::open(&args.database_path)?;
        info!("SQLite store opened at {}", args.database_path.display());
        AppState::new(args, Arc::new(store), codec)
    };

    server::run(Arc::new(state)).await?;

    Ok(())
}
