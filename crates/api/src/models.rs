use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Liveness result of the item service, including the database check
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DatabaseHealthResponse {
    pub status: String,
    /// Server version string, truncated for display
    pub database_version: String,
}

/// Liveness result of the VM writer (no downstream check)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateItemResponse {
    pub status: String,
    pub message: String,
    /// Generated primary key of the inserted row
    pub item_id: i64,
}

/// Outcome of an operation that only reports a message
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}
