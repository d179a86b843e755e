use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use spellbook_api::config::config;
use spellbook_api::database::DatabaseManager;
use spellbook_api::state::AppState;

#[derive(Parser)]
#[command(name = "spellbook-api")]
#[command(about = "Spellbook API - users, characters and spell cards over HTTP")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on")]
        port: Option<u16>,

        #[arg(long, help = "Address to bind")]
        host: Option<String>,
    },

    #[command(about = "Create any missing tables and exit")]
    InitDb,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("spellbook_api=info,tower_http=info"))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve { port: None, host: None }) {
        Commands::Serve { port, host } => serve(port, host).await,
        Commands::InitDb => {
            let pool = DatabaseManager::connect(&config().database).await?;
            DatabaseManager::ensure_schema(&pool).await?;
            Ok(())
        }
    }
}

async fn serve(port: Option<u16>, host: Option<String>) -> anyhow::Result<()> {
    let config = config();
    tracing::info!("Starting Spellbook API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database).await?;
    let state = AppState::new(config, pool)?;
    let app = spellbook_api::app(state, &config.security);

    let bind_addr = format!(
        "{}:{}",
        host.as_deref().unwrap_or(&config.server.host),
        port.unwrap_or(config.server.port)
    );
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
