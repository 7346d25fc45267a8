use secrecy::SecretString;

use super::oci::{ApiKeyCredentials, OciVaultClient, ResourcePrincipal};
use super::ports::VaultError;
use crate::key_material::{assemble_pem, with_transient_key};

/// Materialize the configured private key as a transient `.pem` file, hand
/// the resulting credentials to `build` and delete the file before returning.
pub fn with_api_key_credentials<T, F>(
    config: &config::OciApiKeyConfig,
    build: F,
) -> Result<T, VaultError>
where
    F: FnOnce(&ApiKeyCredentials) -> Result<T, VaultError>,
{
    let pem: SecretString = assemble_pem(&config.private_key_content)?;
    with_transient_key(&pem, |key_file| {
        build(&ApiKeyCredentials::new(config, key_file))
    })
}

/// Vault client authenticated with the API key from the environment
pub fn connect_with_api_key(
    config: &config::OciApiKeyConfig,
    settings: &config::VaultConfig,
) -> Result<OciVaultClient, VaultError> {
    with_api_key_credentials(config, |credentials| {
        OciVaultClient::with_api_key(credentials, settings)
    })
}

/// Vault client authenticated with the platform-provided workload identity
pub fn connect_with_resource_principal(
    settings: &config::VaultConfig,
) -> Result<OciVaultClient, VaultError> {
    let principal = ResourcePrincipal::from_env()?;
    OciVaultClient::with_resource_principal(principal, settings)
}
