mod config;

use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use quill_api::router::router;
use quill_api::state::AppState;
use quill_db::Database;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "quill", version, about = "A small multi-user blog")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web server (default)
    Serve,
    /// Clear the existing data and create new tables
    InitDb,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=debug,quill_api=debug,quill_db=info,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let db = Database::open(&config.db_path)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::InitDb => {
            db.reset()?;
            println!("Initialized the database.");
            Ok(())
        }
        Command::Serve => serve(config, db).await,
    }
}

async fn serve(config: Config, db: Database) -> anyhow::Result<()> {
    if config.uses_default_secret() {
        warn!("QUILL_SECRET_KEY is not set, sessions are signed with the development key");
    }

    let state = AppState::new(db, &config.secret_key)?;
    let app = router(state).layer(TraceLayer::new_for_http());

    let addr = config.addr()?;
    info!("Quill listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
