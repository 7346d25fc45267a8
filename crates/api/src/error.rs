use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use services::diagnostics::ProbeError;
use services::item::ItemError;
use services::vm::VmWriteError;
use utoipa::ToSchema;

/// Error body returned to API consumers
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ApiErrorResponse {
    /// Human-readable description of what went wrong
    pub detail: String,
}

/// Status code plus the body rendered for it
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                detail: detail.into(),
            },
        }
    }

    /// 500 Internal Server Error
    pub fn internal_server_error(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    /// 503 Service Unavailable
    pub fn service_unavailable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, detail)
    }

    /// 504 Gateway Timeout
    pub fn gateway_timeout(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, detail)
    }
}

/// Implement IntoResponse so ApiError can be returned directly from handlers
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("Internal error: {:#}", err);
        Self::internal_server_error("An internal error occurred")
    }
}

/// Malformed or unparseable request bodies keep axum's status but get a JSON body.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!("Rejected request body: {}", rejection.body_text());
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<ItemError> for ApiError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::Unavailable(msg) => {
                tracing::error!("Database unavailable: {}", msg);
                Self::service_unavailable(format!("Service Unavailable: {msg}"))
            }
            ItemError::Database(msg) => {
                tracing::error!("Database operation failed: {}", msg);
                Self::internal_server_error(format!("Database operation failed: {msg}"))
            }
        }
    }
}

impl From<VmWriteError> for ApiError {
    fn from(err: VmWriteError) -> Self {
        match err {
            VmWriteError::NotInitialized => {
                tracing::error!("VM credentials not initialized");
                Self::service_unavailable("Service Unavailable: VM credentials not initialized.")
            }
            other => {
                tracing::error!("Failed to write file to VM: {}", other);
                Self::internal_server_error(format!("SSH or file operation failed: {other}"))
            }
        }
    }
}

impl From<ProbeError> for ApiError {
    fn from(err: ProbeError) -> Self {
        tracing::error!("{}", err);
        match err {
            ProbeError::Timeout { .. } => Self::gateway_timeout(err.to_string()),
            ProbeError::Connect { .. } => Self::internal_server_error(err.to_string()),
        }
    }
}
