use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use ladle_api::config;
use ladle_api::database::Gateway;
use ladle_api::identity::PgIdentityProvider;
use ladle_api::state::AppState;
use ladle_api::storage::SigV4Signer;

#[derive(Parser)]
#[command(name = "ladle-api", about = "Recipe-sharing backend API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Port to listen on; falls back to LADLE_API_PORT / PORT / 3000
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting Ladle API in {:?} mode", config.environment);

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(port).await,
        Command::Migrate => migrate().await,
    }
}

async fn serve(port: Option<u16>) -> anyhow::Result<()> {
    let config = config::config();

    let gateway = Gateway::connect(&config.database)
        .await
        .context("database connection failed")?;

    let identity = Arc::new(PgIdentityProvider::new(
        gateway.clone(),
        config.auth.session_cookie.clone(),
    ));
    let signer = Arc::new(SigV4Signer::new(config.storage.clone()));
    let state = AppState::new(gateway, identity, signer);

    let app = ladle_api::app(state);

    // Allow tests or deployments to override port via env
    let port = port
        .or_else(|| std::env::var("LADLE_API_PORT").ok().and_then(|s| s.parse().ok()))
        .or_else(|| std::env::var("PORT").ok().and_then(|s| s.parse().ok()))
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Ladle API listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server")?;
    Ok(())
}

async fn migrate() -> anyhow::Result<()> {
    let config = config::config();
    let gateway = Gateway::connect(&config.database)
        .await
        .context("database connection failed")?;
    gateway.migrate().await.context("migration failed")?;
    gateway.close().await;
    Ok(())
}
