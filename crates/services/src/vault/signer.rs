//! HTTP request signing for the vault API (draft-cavage HTTP signatures,
//! RSA-SHA256 over `date`, `(request-target)` and `host`).

use base64::{engine::general_purpose::STANDARD, Engine};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::sha2::Sha256;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;

use super::ports::VaultError;

pub const SIGNED_HEADERS: &str = "date (request-target) host";

/// Parse an unencrypted RSA private key in PKCS#1 or PKCS#8 PEM form.
pub fn parse_private_key(pem: &str) -> Result<RsaPrivateKey, VaultError> {
    RsaPrivateKey::from_pkcs1_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
        .map_err(|e| VaultError::SigningKey(e.to_string()))
}

/// The exact text that gets signed for one request.
pub fn signing_string(method: &str, path_and_query: &str, host: &str, date: &str) -> String {
    format!(
        "date: {date}\n(request-target): {} {path_and_query}\nhost: {host}",
        method.to_ascii_lowercase()
    )
}

pub struct RequestSigner {
    key_id: String,
    signing_key: SigningKey<Sha256>,
}

impl RequestSigner {
    pub fn new(key_id: impl Into<String>, private_key: RsaPrivateKey) -> Self {
        Self {
            key_id: key_id.into(),
            signing_key: SigningKey::<Sha256>::new(private_key),
        }
    }

    /// Value of the `Authorization` header for a request.
    pub fn authorization(
        &self,
        method: &str,
        path_and_query: &str,
        host: &str,
        date: &str,
    ) -> String {
        let message = signing_string(method, path_and_query, host, date);
        let signature = self.signing_key.sign(message.as_bytes());

        format!(
            "Signature version=\"1\",keyId=\"{}\",algorithm=\"rsa-sha256\",headers=\"{}\",signature=\"{}\"",
            self.key_id,
            SIGNED_HEADERS,
            STANDARD.encode(signature.to_bytes())
        )
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}
