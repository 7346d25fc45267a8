use async_trait::async_trait;

use crate::key_material::KeyMaterialError;

/// Current version of a secret as served by the vault
#[derive(Debug, Clone)]
pub struct SecretBundle {
    pub secret_id: String,
    pub version_number: Option<i64>,
    /// Base64-encoded payload
    pub content: String,
}

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("Invalid vault credentials: {}", .0.join("; "))]
    InvalidCredentials(Vec<String>),
    #[error("No workload identity available: {0}")]
    IdentityUnavailable(String),
    #[error("Unreadable signing key: {0}")]
    SigningKey(String),
    #[error("Vault request failed: {0}")]
    Request(String),
    #[error("Vault returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed secret bundle: {0}")]
    MalformedBundle(String),
    #[error(transparent)]
    KeyMaterial(#[from] KeyMaterialError),
}

/// Read access to a secrets vault
#[async_trait]
pub trait SecretsVault: Send + Sync {
    /// Fetch the current bundle of `secret_id`
    async fn get_secret_bundle(&self, secret_id: &str) -> Result<SecretBundle, VaultError>;
}
