use base64::{engine::general_purpose::STANDARD, Engine};
use serde::de::DeserializeOwned;

use super::ports::{SecretsVault, VaultError};

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error(transparent)]
    Vault(#[from] VaultError),
    #[error("Secret content is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Secret content is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("Secret {secret_id} is missing required fields: {source}")]
    Record {
        secret_id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode the base64 payload of a secret bundle into text.
pub fn decode_secret_content(content: &str) -> Result<String, SecretError> {
    let bytes = STANDARD.decode(content.trim())?;
    Ok(String::from_utf8(bytes)?)
}

/// Fetch `secret_id` and parse its JSON payload as `T`.
pub async fn resolve_secret<T>(vault: &dyn SecretsVault, secret_id: &str) -> Result<T, SecretError>
where
    T: DeserializeOwned,
{
    let bundle = vault.get_secret_bundle(secret_id).await?;
    tracing::info!(
        secret_id,
        version = ?bundle.version_number,
        "Secret bundle retrieved from vault"
    );

    let text = decode_secret_content(&bundle.content)?;
    serde_json::from_str(&text).map_err(|source| SecretError::Record {
        secret_id: secret_id.to_string(),
        source,
    })
}
