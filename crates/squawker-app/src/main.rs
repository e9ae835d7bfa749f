mod cli;
mod commands;
mod terminal;

use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging; stderr keeps stdout for the list itself
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "squawker=info,squawker_client=info,squawker_db=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::List => commands::list(&cli.db).await,
        Command::Watch { poll_ms } => {
            info!("Watching {} (poll every {} ms)", cli.db.display(), poll_ms);
            commands::watch(&cli.db, Command::poll_interval(poll_ms)).await
        }
        Command::Post {
            author_key,
            author,
            date,
            message,
        } => commands::post(&cli.db, author_key, author, date, message).await,
        Command::Ingest => commands::ingest(&cli.db).await,
        Command::Follow { author, off } => commands::follow(&cli.db, author, !off).await,
        Command::Authors => commands::authors(&cli.db).await,
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
