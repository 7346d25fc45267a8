use std::sync::Arc;
use std::time::Duration;

use services::diagnostics::{ProbeTarget, DEFAULT_PROBE_TIMEOUT};
use services::item::ItemService;
use services::vm::VmWriterService;

/// State shared by the item service handlers
#[derive(Clone)]
pub struct ItemAppState {
    pub item_service: Arc<dyn ItemService>,
    /// Database address for the connectivity probe; `None` when credentials
    /// were never resolved
    pub probe_target: Option<ProbeTarget>,
    pub probe_timeout: Duration,
}

impl ItemAppState {
    pub fn new(item_service: Arc<dyn ItemService>, probe_target: Option<ProbeTarget>) -> Self {
        Self {
            item_service,
            probe_target,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }
}

/// State shared by the VM writer handlers
#[derive(Clone)]
pub struct VmWriterAppState {
    pub vm_writer_service: Arc<dyn VmWriterService>,
}

impl VmWriterAppState {
    pub fn new(vm_writer_service: Arc<dyn VmWriterService>) -> Self {
        Self { vm_writer_service }
    }
}
