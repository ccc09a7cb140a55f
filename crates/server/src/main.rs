use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use docwatch_scheduler::{ReminderOrchestrator, ReminderScheduler};
use docwatch_server::api::AppState;
use docwatch_server::config::DocwatchConfig;
use docwatch_server::error::ServerError;

/// Document expiry reminder service.
#[derive(Parser, Debug)]
#[command(name = "docwatch", about = "Sends reminders for documents nearing expiry")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "docwatch.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the scheduler and trigger API (the default).
    Serve,
    /// Run a single reminder pass, print its report as JSON, then exit.
    RunOnce {
        /// Evaluate as of this day (YYYY-MM-DD) instead of today in UTC.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Send one reminder immediately, bypassing the schedule and dedup.
    TestReminder {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        document: Uuid,
    },
    /// Create the database schema for the configured store, then exit.
    Migrate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = DocwatchConfig::load(Path::new(&cli.config))?;

    let telemetry_guard = docwatch_server::telemetry::init(&config.telemetry);
    if !Path::new(&cli.config).exists() {
        info!(path = %cli.config, "config file not found, using defaults");
    }

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config, cli.host, cli.port).await,
        Commands::RunOnce { date } => run_once(&config, date).await,
        Commands::TestReminder { user, document } => test_reminder(&config, user, document).await,
        Commands::Migrate => migrate(&config).await,
    };

    telemetry_guard.shutdown();
    result.map_err(Into::into)
}

async fn build_orchestrator(config: &DocwatchConfig) -> Result<Arc<ReminderOrchestrator>, ServerError> {
    let store = docwatch_server::store_factory::create_store(&config.store).await?;
    let registry =
        docwatch_server::transport_factory::build_registry(&config.channels, &config.phone)?;

    let orchestrator = ReminderOrchestrator::builder()
        .shared_store(store)
        .transports(registry)
        .config(config.scheduler.orchestrator())
        .build()?;
    Ok(Arc::new(orchestrator))
}

async fn serve(
    config: DocwatchConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), ServerError> {
    let orchestrator = build_orchestrator(&config).await?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let scheduler_handle = if config.scheduler.enabled {
        let mut scheduler = ReminderScheduler::new(
            Arc::clone(&orchestrator),
            &config.scheduler.schedule(),
            shutdown_rx,
        )?;
        info!(
            cron = %config.scheduler.cron,
            timezone = %config.scheduler.timezone,
            "reminder scheduler enabled"
        );
        Some(tokio::spawn(async move { scheduler.run().await }))
    } else {
        info!("reminder scheduler disabled, passes run only on request");
        None
    };

    let app = docwatch_server::api::router(AppState { orchestrator });

    let host = host.unwrap_or(config.server.host);
    let port = port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "docwatch listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = scheduler_handle {
        let _ = shutdown_tx.send(()).await;
        let timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
        if tokio::time::timeout(timeout, handle).await.is_err() {
            warn!(
                timeout_secs = config.server.shutdown_timeout_seconds,
                "reminder pass still running at shutdown timeout"
            );
        }
    }

    info!("docwatch shut down");
    Ok(())
}

async fn run_once(config: &DocwatchConfig, date: Option<NaiveDate>) -> Result<(), ServerError> {
    let orchestrator = build_orchestrator(config).await?;
    let report = match date {
        Some(date) => orchestrator.run_pass_for(date).await,
        None => orchestrator.run_scheduled_pass().await,
    };
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| ServerError::Config(format!("failed to encode report: {e}")))?;
    println!("{json}");

    match report.aborted {
        Some(reason) => Err(ServerError::Config(format!("reminder pass aborted: {reason}"))),
        None => Ok(()),
    }
}

async fn test_reminder(config: &DocwatchConfig, user: Uuid, document: Uuid) -> Result<(), ServerError> {
    let orchestrator = build_orchestrator(config).await?;
    if orchestrator.send_test_reminder(user, document).await {
        info!(%user, %document, "test reminder delivered");
        Ok(())
    } else {
        Err(ServerError::Config(format!(
            "test reminder for document {document} was not delivered"
        )))
    }
}

async fn migrate(config: &DocwatchConfig) -> Result<(), ServerError> {
    info!(backend = %config.store.backend, "running store migrations...");
    docwatch_server::store_factory::create_store(&config.store).await?;
    info!("migrations complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
