use axum::{extract::rejection::JsonRejection, extract::State, Json};
use services::item::NewItem;

use crate::error::{ApiError, ApiErrorResponse};
use crate::models::{CreateItemResponse, DatabaseHealthResponse};
use crate::state::ItemAppState;

/// Health check with database liveness
///
/// Leases a pooled connection, runs a trivial query and reports the server version.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Monitoring",
    responses(
        (status = 200, description = "Database reachable", body = DatabaseHealthResponse),
        (status = 500, description = "Database query failed", body = ApiErrorResponse),
        (status = 503, description = "Database pool unavailable", body = ApiErrorResponse)
    )
)]
pub async fn health_check(
    State(state): State<ItemAppState>,
) -> Result<Json<DatabaseHealthResponse>, ApiError> {
    tracing::info!("Health check requested");

    let database_version = state.item_service.database_version().await?;

    Ok(Json(DatabaseHealthResponse {
        status: "ok".to_string(),
        database_version,
    }))
}

/// Insert an item
#[utoipa::path(
    post,
    path = "/call",
    tag = "Data Ingestion",
    request_body = NewItem,
    responses(
        (status = 200, description = "Item inserted", body = CreateItemResponse),
        (status = 422, description = "Malformed request body", body = ApiErrorResponse),
        (status = 500, description = "Database operation failed", body = ApiErrorResponse),
        (status = 503, description = "Database pool unavailable", body = ApiErrorResponse)
    )
)]
pub async fn create_item(
    State(state): State<ItemAppState>,
    payload: Result<Json<NewItem>, JsonRejection>,
) -> Result<Json<CreateItemResponse>, ApiError> {
    let Json(item) = payload?;
    let created = state.item_service.create_item(item).await?;

    Ok(Json(CreateItemResponse {
        status: "success".to_string(),
        message: format!("Item '{}' inserted successfully.", created.name),
        item_id: created.id,
    }))
}
