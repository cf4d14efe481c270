//! Croxy Exim backend server
//! Mission: Serve the catalog, take inquiries and run the back office

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use croxy_backend::{
    build_router, AccountStore, AppState, AuthState, Config, Database, TokenService,
};
use dotenv::dotenv;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "croxy")]
#[command(about = "Croxy Exim catalog, inquiry and admin API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Listen port (overrides PORT)
        #[arg(long)]
        port: Option<u16>,

        /// SQLite database file (overrides DATABASE_PATH)
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Insert the starter catalog into an empty database
    Seed {
        /// SQLite database file (overrides DATABASE_PATH)
        #[arg(long)]
        db_path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        db_path: None,
    }) {
        Commands::Serve { port, db_path } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(db_path) = db_path {
                config.database_path = db_path;
            }
            serve(config).await
        }
        Commands::Seed { db_path } => {
            if let Some(db_path) = db_path {
                config.database_path = db_path;
            }
            let db = Database::open(&config.database_path)?;
            let inserted = db.seed_catalog()?;
            info!("Seed complete: {} products inserted", inserted);
            Ok(())
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("🚀 Croxy Exim backend starting");

    if config.uses_dev_secret() {
        warn!("⚠️  JWT_SECRET not set, using the development secret. SET JWT_SECRET IN PRODUCTION!");
    }

    let db = Database::open(&config.database_path)?;

    let accounts = Arc::new(AccountStore::new(db.clone(), &config.admin_password)?);
    let tokens = Arc::new(TokenService::new(&config.jwt_secret)?.with_ttl(config.token_ttl_secs));
    info!("🔐 Token service ready (ttl: {}s)", tokens.ttl_secs());

    let app = build_router(
        AppState::new(db),
        AuthState::new(accounts, tokens),
        config.frontend_url.as_deref(),
    );

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "croxy_backend=debug,croxy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate root .env when run from elsewhere
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
