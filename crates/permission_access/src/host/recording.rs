//! Scripted host for tests and simulations
//!
//! [`RecordingHost`] implements every host trait against in-memory state:
//! grant status and rationale flags are set by the test, dialog answers are
//! queued up front, and every dialog, prompt launch, and settings navigation
//! is recorded for later assertions.

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

use super::{
    Dialog, DialogChoice, DialogPresenter, PermissionLauncher, PermissionOracle,
    PermissionRequest, SettingsNavigator,
};
use crate::error::PermissionError;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Host that answers from scripted state and records every interaction
///
/// Unanswered dialogs resolve to [`DialogChoice::Negative`].
///
/// # Example
///
/// ```
/// use permission_access::host::{DialogChoice, RecordingHost};
///
/// let host = RecordingHost::new(34);
/// host.grant("android.permission.CAMERA");
/// host.require_rationale("android.permission.RECORD_AUDIO");
/// host.answer_dialogs([DialogChoice::Positive]);
/// ```
#[derive(Debug)]
pub struct RecordingHost {
    platform_version: u32,
    granted: Mutex<HashSet<String>>,
    rationale: Mutex<HashSet<String>>,
    failing_queries: Mutex<HashSet<String>>,
    launch_failure: Mutex<Option<String>>,
    dialog_choices: Mutex<VecDeque<DialogChoice>>,
    dialogs: Mutex<Vec<Dialog>>,
    requests: Mutex<Vec<PermissionRequest>>,
    settings_opened: Mutex<Vec<String>>,
    request_tx: mpsc::UnboundedSender<PermissionRequest>,
    request_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<PermissionRequest>>,
}

impl RecordingHost {
    /// Create a host reporting `platform_version` with nothing granted
    pub fn new(platform_version: u32) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        Self {
            platform_version,
            granted: Mutex::new(HashSet::new()),
            rationale: Mutex::new(HashSet::new()),
            failing_queries: Mutex::new(HashSet::new()),
            launch_failure: Mutex::new(None),
            dialog_choices: Mutex::new(VecDeque::new()),
            dialogs: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            settings_opened: Mutex::new(Vec::new()),
            request_tx,
            request_rx: tokio::sync::Mutex::new(request_rx),
        }
    }

    /// Mark a capability as granted
    pub fn grant(&self, capability: impl Into<String>) {
        lock(&self.granted).insert(capability.into());
    }

    /// Mark a capability as not granted
    pub fn revoke(&self, capability: &str) {
        lock(&self.granted).remove(capability);
    }

    /// Make `should_show_rationale` return true for a capability
    pub fn require_rationale(&self, capability: impl Into<String>) {
        lock(&self.rationale).insert(capability.into());
    }

    /// Make grant-status and rationale queries for a capability fail
    pub fn fail_queries_for(&self, capability: impl Into<String>) {
        lock(&self.failing_queries).insert(capability.into());
    }

    /// Make every prompt launch fail with `reason`
    pub fn fail_launches(&self, reason: impl Into<String>) {
        *lock(&self.launch_failure) = Some(reason.into());
    }

    /// Queue answers for upcoming dialogs, in order
    pub fn answer_dialogs(&self, choices: impl IntoIterator<Item = DialogChoice>) {
        lock(&self.dialog_choices).extend(choices);
    }

    /// Every dialog presented so far
    pub fn dialogs(&self) -> Vec<Dialog> {
        lock(&self.dialogs).clone()
    }

    /// Every prompt launched so far
    pub fn requests(&self) -> Vec<PermissionRequest> {
        lock(&self.requests).clone()
    }

    /// Package ids passed to `open_app_settings`
    pub fn settings_opened(&self) -> Vec<String> {
        lock(&self.settings_opened).clone()
    }

    /// Wait for the next prompt launch
    ///
    /// Returns `None` once the host is dropped.
    pub async fn next_request(&self) -> Option<PermissionRequest> {
        self.request_rx.lock().await.recv().await
    }

    fn check_query(&self, capability: &str) -> Result<(), PermissionError> {
        if lock(&self.failing_queries).contains(capability) {
            return Err(PermissionError::host_query(
                capability,
                "scripted query failure",
            ));
        }
        Ok(())
    }
}

impl PermissionOracle for RecordingHost {
    fn platform_version(&self) -> u32 {
        self.platform_version
    }

    fn is_granted(&self, capability: &str) -> Result<bool, PermissionError> {
        self.check_query(capability)?;
        Ok(lock(&self.granted).contains(capability))
    }

    fn should_show_rationale(&self, capability: &str) -> Result<bool, PermissionError> {
        self.check_query(capability)?;
        Ok(lock(&self.rationale).contains(capability))
    }
}

impl PermissionLauncher for RecordingHost {
    fn launch(&self, request: &PermissionRequest) -> Result<(), PermissionError> {
        if let Some(reason) = lock(&self.launch_failure).clone() {
            return Err(PermissionError::Launch(reason));
        }
        lock(&self.requests).push(request.clone());
        // Receiver lives as long as self, so this only fails during teardown.
        let _ = self.request_tx.send(request.clone());
        Ok(())
    }
}

#[async_trait]
impl DialogPresenter for RecordingHost {
    async fn show(&self, dialog: Dialog) -> Result<DialogChoice, PermissionError> {
        lock(&self.dialogs).push(dialog);
        Ok(lock(&self.dialog_choices)
            .pop_front()
            .unwrap_or(DialogChoice::Negative))
    }
}

impl SettingsNavigator for RecordingHost {
    fn open_app_settings(&self, package_id: &str) -> Result<(), PermissionError> {
        lock(&self.settings_opened).push(package_id.to_string());
        Ok(())
    }
}
