//! SSH/SFTP transport for [`RemoteFileWriter`], built on `russh`.

use std::sync::Arc;

use async_trait::async_trait;
use russh::client;
use russh::Disconnect;
use russh_keys::key::PublicKey;
use russh_sftp::client::SftpSession;
use tokio::io::AsyncWriteExt;

use super::ports::{RemoteFileWriter, SshTarget, VmWriteError};

/// Opens a fresh session per call; nothing is pooled.
#[derive(Debug, Clone, Default)]
pub struct SftpFileWriter {
    host_key_fingerprint: Option<String>,
}

impl SftpFileWriter {
    /// `host_key_fingerprint` is the base64 SHA256 fingerprint the server key
    /// must match, with or without a `SHA256:` prefix. `None` accepts any key.
    pub fn new(host_key_fingerprint: Option<String>) -> Self {
        Self {
            host_key_fingerprint: host_key_fingerprint
                .map(|fp| fp.trim().trim_start_matches("SHA256:").to_string())
                .filter(|fp| !fp.is_empty()),
        }
    }

    async fn connect(
        &self,
        target: &SshTarget,
    ) -> Result<client::Handle<HostKeyCheck>, VmWriteError> {
        let key_pair = russh_keys::load_secret_key(&target.key_file, None)
            .map_err(|e| VmWriteError::Connect(format!("cannot load private key: {e}")))?;

        let handler = HostKeyCheck {
            expected: self.host_key_fingerprint.clone(),
        };
        let config = Arc::new(client::Config::default());
        let mut session = client::connect(config, (target.host.as_str(), target.port), handler)
            .await
            .map_err(|e| VmWriteError::Connect(format!("{}:{}: {e}", target.host, target.port)))?;

        let authenticated = session
            .authenticate_publickey(&target.username, Arc::new(key_pair))
            .await
            .map_err(|e| VmWriteError::Connect(e.to_string()))?;
        if !authenticated {
            return Err(VmWriteError::Authentication {
                username: target.username.clone(),
            });
        }

        tracing::debug!("SSH session established: host={}", target.host);
        Ok(session)
    }

    async fn open_sftp(
        session: &client::Handle<HostKeyCheck>,
    ) -> Result<SftpSession, VmWriteError> {
        let channel = session
            .channel_open_session()
            .await
            .map_err(|e| VmWriteError::Transfer(format!("cannot open channel: {e}")))?;
        channel
            .request_subsystem(true, "sftp")
            .await
            .map_err(|e| VmWriteError::Transfer(format!("sftp subsystem refused: {e}")))?;

        SftpSession::new(channel.into_stream())
            .await
            .map_err(|e| VmWriteError::Transfer(e.to_string()))
    }

    async fn disconnect(session: client::Handle<HostKeyCheck>) {
        if let Err(e) = session
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
        {
            tracing::debug!(error = %e, "SSH disconnect failed");
        }
    }
}

#[async_trait]
impl RemoteFileWriter for SftpFileWriter {
    async fn write_file(
        &self,
        target: &SshTarget,
        remote_path: &str,
        content: &[u8],
    ) -> Result<(), VmWriteError> {
        let session = self.connect(target).await?;

        let result = async {
            let sftp = Self::open_sftp(&session).await?;
            let mut file = sftp
                .create(remote_path)
                .await
                .map_err(|e| VmWriteError::Transfer(format!("cannot create {remote_path}: {e}")))?;
            file.write_all(content)
                .await
                .map_err(|e| VmWriteError::Transfer(e.to_string()))?;
            file.shutdown()
                .await
                .map_err(|e| VmWriteError::Transfer(e.to_string()))?;
            sftp.close()
                .await
                .map_err(|e| VmWriteError::Transfer(e.to_string()))
        }
        .await;

        Self::disconnect(session).await;
        result
    }

    async fn read_file(
        &self,
        target: &SshTarget,
        remote_path: &str,
    ) -> Result<Vec<u8>, VmWriteError> {
        let session = self.connect(target).await?;

        let result = async {
            let sftp = Self::open_sftp(&session).await?;
            let bytes = sftp
                .read(remote_path)
                .await
                .map_err(|e| VmWriteError::Transfer(format!("cannot read {remote_path}: {e}")))?;
            sftp.close()
                .await
                .map_err(|e| VmWriteError::Transfer(e.to_string()))?;
            Ok(bytes)
        }
        .await;

        Self::disconnect(session).await;
        result
    }
}

pub struct HostKeyCheck {
    expected: Option<String>,
}

#[async_trait]
impl client::Handler for HostKeyCheck {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        let fingerprint = server_public_key.fingerprint();
        match &self.expected {
            Some(expected) if *expected != fingerprint => {
                tracing::error!(
                    "VM host key mismatch: expected SHA256:{}, got SHA256:{}",
                    expected,
                    fingerprint
                );
                Ok(false)
            }
            Some(_) => Ok(true),
            None => {
                tracing::info!("Accepting VM host key SHA256:{}", fingerprint);
                Ok(true)
            }
        }
    }
}
