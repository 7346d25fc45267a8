use axum::{extract::State, Json};
use services::diagnostics::probe_tcp;

use crate::error::{ApiError, ApiErrorResponse};
use crate::models::StatusResponse;
use crate::state::ItemAppState;

/// Raw TCP reachability of the database host
///
/// Opens and closes a plain socket to the database address without speaking
/// the database protocol, to tell network problems apart from credential or
/// query problems.
#[utoipa::path(
    get,
    path = "/diagnostics/connectivity",
    tag = "Monitoring",
    responses(
        (status = 200, description = "TCP connection established", body = StatusResponse),
        (status = 500, description = "Connection failed", body = ApiErrorResponse),
        (status = 503, description = "Database credentials not initialized", body = ApiErrorResponse),
        (status = 504, description = "Connection timed out", body = ApiErrorResponse)
    )
)]
pub async fn connectivity(
    State(state): State<ItemAppState>,
) -> Result<Json<StatusResponse>, ApiError> {
    let target = state.probe_target.as_ref().ok_or_else(|| {
        ApiError::service_unavailable("Service Unavailable: database credentials not initialized.")
    })?;

    let message = probe_tcp(target, state.probe_timeout).await?;
    Ok(Json(StatusResponse::success(message)))
}
