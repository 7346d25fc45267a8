use axum::{extract::rejection::JsonRejection, extract::State, Json};
use services::vm::VmWriteRequest;

use crate::error::{ApiError, ApiErrorResponse};
use crate::models::{HealthResponse, StatusResponse};
use crate::state::VmWriterAppState;

#[utoipa::path(
    get,
    path = "/health",
    tag = "Monitoring",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Write a file on the VM over SFTP
///
/// Opens a fresh SSH session authenticated with the key from the vault,
/// writes `content` to `path/filename` and closes the session.
#[utoipa::path(
    post,
    path = "/write-file",
    tag = "VM Operations",
    request_body = VmWriteRequest,
    responses(
        (status = 200, description = "File written", body = StatusResponse),
        (status = 422, description = "Malformed request body", body = ApiErrorResponse),
        (status = 500, description = "SSH or SFTP failure", body = ApiErrorResponse),
        (status = 503, description = "VM credentials not initialized", body = ApiErrorResponse)
    )
)]
pub async fn write_file(
    State(state): State<VmWriterAppState>,
    payload: Result<Json<VmWriteRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(request) = payload?;
    tracing::info!(
        "Request to write '{}' to {}",
        request.filename,
        request.path
    );

    let message = state.vm_writer_service.write_file(request).await?;
    Ok(Json(StatusResponse::success(message)))
}
