pub mod bootstrap;
pub mod error;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use error::{ApiError, ApiErrorResponse};
pub use middleware::{invocation_id_middleware, INVOCATION_ID_HEADER};
pub use models::*;
pub use openapi::{ItemApiDoc, VmWriterApiDoc};
pub use routes::{create_item_router, create_vm_writer_router};
pub use state::{ItemAppState, VmWriterAppState};

/// Bind the configured address and serve `app` until the process exits.
pub async fn serve(app: axum::Router, server: &config::ServerConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("OpenAPI document at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
