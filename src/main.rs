use clap::Parser;
use post_search::app::build_service;
use post_search::config::Config;
use post_search::search::handlers::build_router;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("post_search=info,tower_http=info")),
        )
        .init();

    let config = Config::parse();
    tracing::info!("Loading posts from {}", config.posts_dir.display());

    let service = Arc::new(build_service(&config).await?);
    tracing::info!("Serving {} documents", service.store().len());

    let app = build_router(service);

    tracing::info!("HTTP server listening on {}", config.bind);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
