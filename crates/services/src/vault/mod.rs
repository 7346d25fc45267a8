pub mod bootstrap;
pub mod oci;
pub mod ports;
pub mod resolver;
pub mod signer;
pub mod test_helpers;

pub use bootstrap::{connect_with_api_key, connect_with_resource_principal};
pub use oci::OciVaultClient;
pub use ports::{SecretBundle, SecretsVault, VaultError};
pub use resolver::{resolve_secret, SecretError};
