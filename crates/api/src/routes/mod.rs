pub mod diagnostics;
pub mod items;
pub mod vm;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::middleware::invocation_id_middleware;
use crate::openapi::{ItemApiDoc, VmWriterApiDoc};
use crate::state::{ItemAppState, VmWriterAppState};

/// Router of the item service: health, insert and connectivity probe
pub fn create_item_router(app_state: ItemAppState) -> Router {
    Router::new()
        .route("/health", get(items::health_check))
        .route("/call", post(items::create_item))
        .route("/diagnostics/connectivity", get(diagnostics::connectivity))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ItemApiDoc::openapi()) }),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(invocation_id_middleware))
}

/// Router of the VM writer service
pub fn create_vm_writer_router(app_state: VmWriterAppState) -> Router {
    Router::new()
        .route("/health", get(vm::health_check))
        .route("/write-file", post(vm::write_file))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(VmWriterApiDoc::openapi()) }),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(invocation_id_middleware))
}
