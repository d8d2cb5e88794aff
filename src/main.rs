use anyhow::Context;
use api_client::{catalog_view, messages_view, BoardClient};
use clap::{Parser, Subcommand};
use configuration::cli::ServerArgs;
use configuration::Settings;
use database::{connect, initialize, InMemoryStore, MessageStore, PgRepository, RetryPolicy};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// The main entry point for the message board backend.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment and defaults still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut settings = configuration::load_config().context("Failed to load configuration")?;

    // Must stay alive until main returns so buffered file logs are flushed.
    let _log_guard = init_tracing(&settings)?;
    tracing::debug!(?settings, "Configuration loaded.");

    match cli.command.unwrap_or(Commands::Serve { server: ServerArgs::default(), in_memory: false }) {
        Commands::Serve { server, in_memory } => {
            server.apply(&mut settings);
            handle_serve(&settings, in_memory).await
        }
        Commands::InitDb => handle_init_db(&settings).await,
        Commands::View { catalog } => handle_view(&settings, catalog).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A small message board: REST API, static assets and a PostgreSQL store.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database and run the HTTP server (the default).
    Serve {
        #[command(flatten)]
        server: ServerArgs,

        /// Use a volatile in-process store instead of PostgreSQL.
        #[arg(long)]
        in_memory: bool,
    },
    /// Create the messages table and seed it if empty, then exit.
    InitDb,
    /// Fetch from a running server and print the list.
    View {
        /// Show the product catalog instead of the messages.
        #[arg(long)]
        catalog: bool,
    },
}

// ==============================================================================
// Logging
// ==============================================================================

/// Console output always; a daily-rolling file as well when LOG_DIR is set.
/// RUST_LOG takes precedence over the configured filter.
fn init_tracing(settings: &Settings) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.logging.filter))
        .context("Invalid log filter")?;

    let (file_layer, guard) = match &settings.logging.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "message-board.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    Ok(guard)
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Brings the store up, then serves until SIGINT/SIGTERM. A database that is
/// still unreachable after the retry budget aborts startup.
async fn handle_serve(settings: &Settings, in_memory: bool) -> anyhow::Result<()> {
    let store: Arc<dyn MessageStore> = if in_memory {
        tracing::warn!("Using the in-memory store; data will not survive a restart.");
        Arc::new(InMemoryStore::new())
    } else {
        Arc::new(PgRepository::new(connect(&settings.database)))
    };

    let policy = RetryPolicy::from_settings(&settings.database);
    match initialize(store.as_ref(), &policy).await {
        Ok(report) => tracing::info!(
            attempts = report.attempts,
            seeded = report.seeded,
            database_time = %report.database_time,
            "Database ready."
        ),
        Err(e) => {
            tracing::error!(error = %e, "Database initialization failed, shutting down.");
            store.close().await;
            return Err(e).context("Database initialization failed");
        }
    }

    web_server::run_server(&settings.server, store).await
}

async fn handle_init_db(settings: &Settings) -> anyhow::Result<()> {
    let store = PgRepository::new(connect(&settings.database));
    let policy = RetryPolicy::from_settings(&settings.database);

    let result = initialize(&store, &policy).await;
    store.close().await;

    let report = result.context("Database initialization failed")?;
    println!(
        "Database initialized at {} after {} attempt(s); {} sample message(s) inserted.",
        report.database_time, report.attempts, report.seeded
    );
    Ok(())
}

async fn handle_view(settings: &Settings, catalog: bool) -> anyhow::Result<()> {
    let client = BoardClient::from_settings(&settings.client).context("Failed to build HTTP client")?;

    let rendered = if catalog {
        catalog_view(&client).await.render()
    } else {
        messages_view(&client).await.render()
    };
    print!("{rendered}");
    Ok(())
}
