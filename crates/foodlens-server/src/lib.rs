//! HTTP adapter: multipart image upload in, `{"result": "<label>"}` out.

mod error;
mod routes;

pub use error::ApiError;
pub use routes::{AppState, FILE_FIELD, router};

use foodlens_ai::Pipeline;
use foodlens_core::ServerConfig;
use tracing::info;

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, pipeline: Pipeline) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    let labels = pipeline.labels().len();
    let app = router(AppState::new(pipeline), config.body_limit);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        addr = %listener.local_addr()?,
        labels,
        body_limit = config.body_limit,
        "foodlens listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
