use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::ports::{
    remote_path, RemoteFileWriter, SshTarget, VmWriteError, VmWriteRequest, VmWriterService,
};
use crate::credentials::VmCredentials;
use crate::key_material::TransientKeyFile;

pub struct VmWriterServiceImpl {
    credentials: Option<Arc<VmCredentials>>,
    writer: Arc<dyn RemoteFileWriter>,
    timeout: Duration,
}

impl VmWriterServiceImpl {
    pub fn new(
        credentials: Option<Arc<VmCredentials>>,
        writer: Arc<dyn RemoteFileWriter>,
        timeout: Duration,
    ) -> Self {
        Self {
            credentials,
            writer,
            timeout,
        }
    }
}

impl VmWriterServiceImpl {
    /// Run `op` against the VM with a private key file that exists only for
    /// the duration of the call, bounded by the configured timeout.
    async fn with_session<T, F, Fut>(&self, op: F) -> Result<T, VmWriteError>
    where
        F: FnOnce(SshTarget) -> Fut + Send,
        Fut: Future<Output = Result<T, VmWriteError>> + Send,
        T: Send,
    {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(VmWriteError::NotInitialized)?;

        // Dropped on cancellation too, which removes the file.
        let key_file = TransientKeyFile::create(&credentials.private_key)?;
        let target = SshTarget {
            host: credentials.host.clone(),
            port: credentials.port,
            username: credentials.username.clone(),
            key_file: key_file.path().to_path_buf(),
        };

        let outcome = tokio::time::timeout(self.timeout, op(target)).await;

        if let Err(e) = key_file.close() {
            tracing::warn!(error = %e, "Failed to remove transient VM key file");
        }

        outcome.map_err(|_| VmWriteError::Timeout(self.timeout))?
    }
}

#[async_trait]
impl VmWriterService for VmWriterServiceImpl {
    async fn write_file(&self, request: VmWriteRequest) -> Result<String, VmWriteError> {
        let destination = remote_path(&request.path, &request.filename);
        let remote = destination.as_str();
        let content = request.content.as_bytes();

        self.with_session(|target| async move {
            tracing::info!(
                "Writing file to VM: host={}, path={}",
                target.host,
                remote
            );
            self.writer.write_file(&target, remote, content).await
        })
        .await?;

        tracing::info!("File written to VM: path={}", destination);
        Ok(format!(
            "File '{}' written to {}.",
            request.filename, request.path
        ))
    }

    async fn read_file(&self, path: &str, filename: &str) -> Result<Vec<u8>, VmWriteError> {
        let source = remote_path(path, filename);

        self.with_session(|target| async move {
            tracing::info!("Reading file from VM: host={}, path={}", target.host, source);
            self.writer.read_file(&target, &source).await
        })
        .await
    }
}

pub mod test_helpers {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Remote filesystem held in memory.
    ///
    /// Records the key file path of every call and whether it existed while
    /// the call was running.
    #[derive(Default)]
    pub struct MockRemoteFileWriter {
        files: Mutex<HashMap<String, Vec<u8>>>,
        key_files: Mutex<Vec<(PathBuf, bool)>>,
        calls: AtomicUsize,
        delay: Option<Duration>,
        failure: Option<String>,
    }

    impl MockRemoteFileWriter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Every write fails as a transfer error carrying `message`
        pub fn failing(mut self, message: &str) -> Self {
            self.failure = Some(message.to_string());
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().ok()?.get(path).cloned()
        }

        pub fn key_files(&self) -> Vec<(PathBuf, bool)> {
            self.key_files
                .lock()
                .map(|k| k.clone())
                .unwrap_or_default()
        }

        fn record(&self, target: &SshTarget) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut seen) = self.key_files.lock() {
                seen.push((target.key_file.clone(), target.key_file.is_file()));
            }
        }
    }

    #[async_trait]
    impl RemoteFileWriter for MockRemoteFileWriter {
        async fn write_file(
            &self,
            target: &SshTarget,
            remote_path: &str,
            content: &[u8],
        ) -> Result<(), VmWriteError> {
            self.record(target);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(message) = &self.failure {
                return Err(VmWriteError::Transfer(message.clone()));
            }
            if let Ok(mut files) = self.files.lock() {
                files.insert(remote_path.to_string(), content.to_vec());
            }
            Ok(())
        }

        async fn read_file(
            &self,
            target: &SshTarget,
            remote_path: &str,
        ) -> Result<Vec<u8>, VmWriteError> {
            self.record(target);
            self.file(remote_path)
                .ok_or_else(|| VmWriteError::Transfer(format!("no such file: {remote_path}")))
        }
    }
}
