//! PromptSync: background process for conversation extraction and sync.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use promptsync_core::ServerSettings;
use promptsync_server::{build_router, AppState};
use promptsync_sync::SyncScheduler;

fn resolve_data_dir() -> PathBuf {
    std::env::var("PROMPTSYNC_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let settings = ServerSettings::from_env(resolve_data_dir())?;
    info!("Data directory: {}", settings.data_paths.root.display());

    if args.len() > 1 {
        match args[1].as_str() {
            "sync" | "--sync" => {
                // One batch over every cached record, then exit
                let state = AppState::new(settings)?;
                let result = state.engine.sync_all().await;
                println!("{}", serde_json::to_string_pretty(&result)?);
                std::process::exit(if result.failures.is_empty() { 0 } else { 1 });
            }
            "--help" | "-h" | "help" => {
                println!("PromptSync: conversation extraction and sync background process");
                println!();
                println!("Usage: promptsync [command]");
                println!();
                println!("Commands:");
                println!("  (none)    Start the background process and local bridge");
                println!("  sync      Push every cached conversation once and exit");
                println!("  help      Show this help message");
                println!();
                println!("Environment: PORT (default 3004), PROMPTSYNC_DATA_DIR (default data/)");
                return Ok(());
            }
            other => {
                eprintln!("Unknown command: {}. Use 'promptsync help' for usage.", other);
                std::process::exit(1);
            }
        }
    }

    let port = settings.port;
    let state = Arc::new(AppState::new(settings)?);

    // The configured interval is read once at startup; auto-sync is re-checked every tick
    let scheduler = SyncScheduler::spawn(state.engine.clone(), state.sync_interval()?);

    let app = build_router(state.clone());
    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("PromptSync bridge listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop();
    Ok(())
}
