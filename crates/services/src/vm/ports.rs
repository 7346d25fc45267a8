use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::key_material::KeyMaterialError;

pub const DEFAULT_FILENAME: &str = "hello_world.txt";
pub const DEFAULT_CONTENT: &str = "Hello from the serverless function!";
pub const DEFAULT_PATH: &str = "/tmp";

/// File to create on the VM. Every field has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct VmWriteRequest {
    #[serde(default = "default_filename")]
    #[cfg_attr(feature = "utoipa", schema(default = "hello_world.txt"))]
    pub filename: String,
    #[serde(default = "default_content")]
    #[cfg_attr(feature = "utoipa", schema(default = "Hello from the serverless function!"))]
    pub content: String,
    #[serde(default = "default_path")]
    #[cfg_attr(feature = "utoipa", schema(default = "/tmp"))]
    pub path: String,
}

fn default_filename() -> String {
    DEFAULT_FILENAME.to_string()
}

fn default_content() -> String {
    DEFAULT_CONTENT.to_string()
}

fn default_path() -> String {
    DEFAULT_PATH.to_string()
}

impl Default for VmWriteRequest {
    fn default() -> Self {
        Self {
            filename: default_filename(),
            content: default_content(),
            path: default_path(),
        }
    }
}

/// Join a remote directory and a file name with POSIX separators.
pub fn remote_path(directory: &str, filename: &str) -> String {
    if directory.is_empty() {
        return filename.to_string();
    }
    format!("{}/{}", directory.trim_end_matches('/'), filename)
}

#[derive(Debug, thiserror::Error)]
pub enum VmWriteError {
    #[error("VM credentials are not initialized")]
    NotInitialized,
    #[error(transparent)]
    KeyMaterial(#[from] KeyMaterialError),
    #[error("SSH connection failed: {0}")]
    Connect(String),
    #[error("SSH authentication failed for user {username}")]
    Authentication { username: String },
    #[error("SFTP transfer failed: {0}")]
    Transfer(String),
    #[error("SSH operation timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Where and as whom to log in
#[derive(Debug, Clone)]
pub struct SshTarget {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Private key on disk, valid for the duration of one call
    pub key_file: PathBuf,
}

#[async_trait]
pub trait RemoteFileWriter: Send + Sync {
    async fn write_file(
        &self,
        target: &SshTarget,
        remote_path: &str,
        content: &[u8],
    ) -> Result<(), VmWriteError>;

    async fn read_file(
        &self,
        target: &SshTarget,
        remote_path: &str,
    ) -> Result<Vec<u8>, VmWriteError>;
}

#[async_trait]
pub trait VmWriterService: Send + Sync {
    /// Write one file on the VM and return a human-readable confirmation
    async fn write_file(&self, request: VmWriteRequest) -> Result<String, VmWriteError>;

    /// Read `path/filename` back from the VM over a new session
    async fn read_file(&self, path: &str, filename: &str) -> Result<Vec<u8>, VmWriteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: VmWriteRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.filename, "hello_world.txt");
        assert_eq!(request.content, "Hello from the serverless function!");
        assert_eq!(request.path, "/tmp");
    }

    #[test]
    fn test_partial_request_keeps_other_defaults() {
        let request: VmWriteRequest = serde_json::from_str(r#"{"filename": "x.txt"}"#).unwrap();
        assert_eq!(request.filename, "x.txt");
        assert_eq!(request.path, DEFAULT_PATH);
    }

    #[test]
    fn test_remote_path_join() {
        assert_eq!(remote_path("/tmp", "x.txt"), "/tmp/x.txt");
        assert_eq!(remote_path("/tmp/", "x.txt"), "/tmp/x.txt");
        assert_eq!(remote_path("/", "x.txt"), "/x.txt");
        assert_eq!(remote_path("", "x.txt"), "x.txt");
        assert_eq!(remote_path("data", "x.txt"), "data/x.txt");
    }
}
