use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing_subscriber::EnvFilter;

use ticket_intake::config::{Config, LoggingConfig};
use ticket_intake::services::{
    AnthropicClassifier, JobConsumer, OpenAiDrafter, RedisJobQueue, ResponseDrafter,
    TicketClassifier, TicketProcessor, TicketService,
};
use ticket_intake::{build_router, AppState};

#[derive(Parser)]
#[command(name = "ticket-intake", version, about = "Customer-support ticket intake API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server
    Serve,
    /// Run the background queue worker
    Worker,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load()?;
    let _guard = init_tracing(&config.logging);

    let options =
        SqliteConnectOptions::from_str(&config.database.url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, pool).await,
        Command::Worker => worker(config, pool).await,
    }
}

async fn serve(config: Config, pool: SqlitePool) -> anyhow::Result<()> {
    let dispatcher = RedisJobQueue::new(&config.queue.url, &config.queue.key)?;
    let state = Arc::new(AppState {
        tickets: TicketService::new(pool),
        dispatcher: Arc::new(dispatcher),
    });

    let app = build_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn worker(config: Config, pool: SqlitePool) -> anyhow::Result<()> {
    let queue = RedisJobQueue::new(&config.queue.url, &config.queue.key)?;
    let classifier: Arc<dyn TicketClassifier> =
        Arc::new(AnthropicClassifier::new(&config.anthropic));
    let drafter: Arc<dyn ResponseDrafter> = Arc::new(OpenAiDrafter::new(&config.openai));

    let processor = TicketProcessor::new(TicketService::new(pool), classifier, drafter);
    JobConsumer::new(queue, processor).run().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

fn init_tracing(logging: &LoggingConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match &logging.file {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "ticket-intake.log".to_string());

            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        },
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        },
    }
}
