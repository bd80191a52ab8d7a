use anyhow::Result;
use pantry_api::create_app;
use std::env;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (if present) before reading any configuration
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber to log to stdout
    tracing_subscriber::fmt::init();
    info!("Starting Pantry API server v{}...", env!("CARGO_PKG_VERSION"));

    let app = create_app().await?;

    // Get optional bind endpoint from environment
    let endpoint = env::var("PANTRY_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    info!("Starting at endpoint:{}", endpoint);

    let listener = TcpListener::bind(&endpoint).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves when the process receives Ctrl+C, letting in-flight requests
/// finish before the server exits.
async fn shutdown_signal() {
    // ---
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
