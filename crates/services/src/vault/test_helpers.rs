use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};

use super::ports::{SecretBundle, SecretsVault, VaultError};

/// In-memory vault for tests
#[derive(Default)]
pub struct MockSecretsVault {
    secrets: HashMap<String, String>,
    fetches: AtomicUsize,
}

impl MockSecretsVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` serialized and base64-encoded, as the real vault serves it
    pub fn with_json_secret(mut self, secret_id: &str, value: &serde_json::Value) -> Self {
        self.secrets
            .insert(secret_id.to_string(), STANDARD.encode(value.to_string()));
        self
    }

    /// Store `content` exactly as given
    pub fn with_raw_secret(mut self, secret_id: &str, content: &str) -> Self {
        self.secrets
            .insert(secret_id.to_string(), content.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretsVault for MockSecretsVault {
    async fn get_secret_bundle(&self, secret_id: &str) -> Result<SecretBundle, VaultError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let content = self
            .secrets
            .get(secret_id)
            .cloned()
            .ok_or_else(|| VaultError::Status {
                status: 404,
                body: format!("secret {secret_id} not found"),
            })?;

        Ok(SecretBundle {
            secret_id: secret_id.to_string(),
            version_number: Some(1),
            content,
        })
    }
}
