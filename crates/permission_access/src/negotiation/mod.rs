//! The permission negotiation state machine
//!
//! A [`Negotiator`] is bound to one hosting screen. Each call to
//! [`Negotiator::ensure_granted`] runs one negotiation from scratch: it
//! re-reads grant status from the host, so no state is cached between calls.
//!
//! ```text
//! IDLE --ensure_granted--> [all granted?]
//!    yes -> GRANTED (callback fires)
//!    no  -> [any rationale needed?]
//!             yes -> RATIONALE
//!             no  -> REQUESTING
//! RATIONALE --positive--> REQUESTING
//! RATIONALE --negative--> DENIED
//! REQUESTING --all granted--> GRANTED (callback fires)
//! REQUESTING --any denied--> DENIED
//! DENIED --positive--> open app settings, done
//! DENIED --negative--> done
//! ```
//!
//! Capabilities that do not exist on the current platform version are dropped
//! before any of this happens; they never block success and never appear in a
//! dialog.
//!
//! # Lifecycle
//!
//! The OS prompt is the only point where the negotiation waits on the
//! platform. The host launches the prompt through
//! [`PermissionLauncher`](crate::host::PermissionLauncher) and later delivers
//! the answer with [`Negotiator::on_permission_result`]. If the screen is
//! destroyed first, [`Negotiator::on_screen_destroyed`] drops the parked
//! continuation: the negotiation resolves to [`NegotiationOutcome::Cancelled`]
//! without touching the callback or presenting anything else.
//!
//! # Example
//!
//! ```
//! use permission_access::prelude::*;
//! use permission_access::capability::manifest;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), PermissionError> {
//! let host = Arc::new(RecordingHost::new(34));
//! host.grant(manifest::POST_NOTIFICATIONS);
//!
//! let negotiator = Negotiator::builder()
//!     .capabilities([manifest::POST_NOTIFICATIONS])
//!     .callback(|| println!("Notification access granted"))
//!     .package_id("com.morg.permission")
//!     .host(host.clone())
//!     .build()?;
//!
//! let outcome = negotiator.ensure_granted().await?;
//! assert_eq!(outcome, NegotiationOutcome::Granted);
//! assert!(host.dialogs().is_empty());
//! # Ok(())
//! # }
//! ```

pub(crate) mod pending;

pub use pending::PromptResults;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::callback::PermissionCallback;
use crate::capability::{Capability, CapabilityTable};
use crate::config::NegotiationConfig;
use crate::error::PermissionError;
use crate::host::{
    Dialog, DialogChoice, DialogPresenter, HostBindings, PermissionLauncher, PermissionOracle,
    PermissionRequest, SettingsNavigator,
};
use pending::PendingPrompts;

/// Where the negotiator currently is in the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationState {
    /// No negotiation has run, or the last one was cancelled or failed
    Idle,
    /// Rationale dialog on screen
    Rationale,
    /// OS permission prompt on screen
    Requesting,
    /// Denied dialog on screen, or the last negotiation ended denied
    Denied,
    /// The last negotiation ended with every capability granted
    Granted,
}

/// Terminal result of one negotiation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NegotiationOutcome {
    /// Every supported capability is granted; the callback fired
    Granted,
    /// At least one capability is still denied
    Denied {
        /// Capability ids that remain denied
        denied: Vec<String>,
        /// Whether the user chose to open the app settings screen
        settings_opened: bool,
    },
    /// The hosting screen went away before the negotiation finished
    Cancelled,
}

impl NegotiationOutcome {
    /// Whether this outcome is [`NegotiationOutcome::Granted`]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Releases the negotiator when a negotiation ends or its future is dropped
///
/// Unless the negotiation settled as granted or denied, the state falls back
/// to [`NegotiationState::Idle`].
struct InFlight<'a> {
    negotiator: &'a Negotiator,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.negotiator.set_state(NegotiationState::Idle);
        }
        self.negotiator.in_flight.store(false, Ordering::SeqCst);
    }
}

/// Removes a prompt's parked sender once nothing waits on it any more
struct ParkedPrompt<'a> {
    pending: &'a PendingPrompts,
    id: String,
}

impl Drop for ParkedPrompt<'_> {
    fn drop(&mut self) {
        if self.pending.cancel(&self.id) {
            debug!("Released unanswered permission prompt {}", self.id);
        }
    }
}

/// Runs permission negotiations for one hosting screen
///
/// Construct with [`Negotiator::builder`]. Share it behind an `Arc` (or a
/// plain reference) so the host's prompt-result callback can reach
/// [`on_permission_result`](Self::on_permission_result) while
/// [`ensure_granted`](Self::ensure_granted) is waiting.
pub struct Negotiator {
    capabilities: Vec<String>,
    callback: Arc<dyn PermissionCallback>,
    config: NegotiationConfig,
    table: Arc<CapabilityTable>,
    package_id: String,
    bindings: RwLock<HostBindings>,
    pending: PendingPrompts,
    state: Mutex<NegotiationState>,
    in_flight: AtomicBool,
    detached: AtomicBool,
}

impl std::fmt::Debug for Negotiator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Negotiator")
            .field("capabilities", &self.capabilities)
            .field("package_id", &self.package_id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Negotiator {
    /// Create a new negotiator builder
    pub fn builder() -> NegotiatorBuilder {
        NegotiatorBuilder::default()
    }

    /// The requested capability set, in request order
    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    /// Current position in the state machine
    pub fn state(&self) -> NegotiationState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a negotiation is currently running
    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Make sure every requested capability is granted
    ///
    /// Runs one full negotiation. Returns [`PermissionError::NegotiationInProgress`]
    /// if another negotiation on this negotiator has not finished yet, and
    /// [`PermissionError::ScreenDetached`] after
    /// [`on_screen_destroyed`](Self::on_screen_destroyed) until the next
    /// [`rebind`](Self::rebind). Host failures are returned as errors and never
    /// reported as a denial.
    pub async fn ensure_granted(&self) -> Result<NegotiationOutcome, PermissionError> {
        if self.is_detached() {
            warn!("ensure_granted called on a detached negotiator");
            return Err(PermissionError::ScreenDetached);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Rejected ensure_granted: a negotiation is already in progress");
            return Err(PermissionError::NegotiationInProgress);
        }
        let mut in_flight = InFlight {
            negotiator: self,
            settled: false,
        };

        self.set_state(NegotiationState::Idle);
        let result = self.negotiate().await;
        in_flight.settled = matches!(
            result,
            Ok(NegotiationOutcome::Granted | NegotiationOutcome::Denied { .. })
        );
        if let Err(e) = &result {
            warn!("Negotiation failed: {}", e);
        }
        result
    }

    /// Deliver the OS prompt's answer for `request_id`
    ///
    /// Returns `true` if a negotiation was waiting for this request. Results
    /// for unknown, stale, or cancelled requests are ignored.
    pub async fn on_permission_result(&self, request_id: &str, results: PromptResults) -> bool {
        let delivered = self.pending.complete(request_id, results);
        if delivered {
            debug!("Delivered permission results for request {}", request_id);
        } else {
            warn!("Ignored permission results for unknown request {}", request_id);
        }
        delivered
    }

    /// Detach from a destroyed hosting screen
    ///
    /// Drops every pending prompt continuation so no callback or dialog runs
    /// against the dead screen. New negotiations are rejected until
    /// [`rebind`](Self::rebind).
    pub async fn on_screen_destroyed(&self) {
        self.detached.store(true, Ordering::SeqCst);
        let dropped = self.pending.cancel_all();
        info!(
            "Hosting screen destroyed; dropped {} pending permission prompt(s)",
            dropped
        );
    }

    /// Re-attach to a recreated hosting screen
    pub fn rebind(&self, bindings: HostBindings) {
        *self.bindings.write().unwrap_or_else(PoisonError::into_inner) = bindings;
        self.detached.store(false, Ordering::SeqCst);
        debug!("Negotiator re-bound to a new hosting screen");
    }

    fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }

    fn set_state(&self, state: NegotiationState) {
        let mut current = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != state {
            debug!("Negotiation state {:?} -> {:?}", *current, state);
            *current = state;
        }
    }

    fn snapshot_bindings(&self) -> HostBindings {
        self.bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn resolve(&self, ids: &[String]) -> Vec<Capability> {
        ids.iter().map(|id| self.table.resolve(id)).collect()
    }

    async fn negotiate(&self) -> Result<NegotiationOutcome, PermissionError> {
        let bindings = self.snapshot_bindings();
        let oracle: &dyn PermissionOracle = bindings.oracle.as_ref();
        let version = oracle.platform_version();

        let mut denied = Vec::new();
        let mut checked = 0usize;
        for id in &self.capabilities {
            if !self.table.is_supported(id, version) {
                debug!(
                    "Skipping {}: not available on platform version {}",
                    id, version
                );
                continue;
            }
            checked += 1;
            if !oracle.is_granted(id)? {
                denied.push(id.clone());
            }
        }
        debug!(
            "{} of {} supported capabilities already granted",
            checked - denied.len(),
            checked
        );

        if denied.is_empty() {
            return Ok(self.finish_granted());
        }

        let mut needs_rationale = false;
        for id in &denied {
            if oracle.should_show_rationale(id)? {
                needs_rationale = true;
                break;
            }
        }

        if needs_rationale {
            self.set_state(NegotiationState::Rationale);
            let dialog = Dialog::rationale(&self.config.rationale, self.resolve(&denied));
            let choice = bindings.dialogs.show(dialog).await?;
            if self.is_detached() {
                return Ok(self.finish_cancelled());
            }
            if choice == DialogChoice::Negative {
                debug!("Rationale declined; skipping the OS prompt");
                return self
                    .finish_denied(bindings.dialogs.as_ref(), bindings.settings.as_ref(), denied)
                    .await;
            }
        }

        self.set_state(NegotiationState::Requesting);
        let results = match self.request_grants(bindings.launcher.as_ref(), &denied).await? {
            Some(results) => results,
            None => return Ok(self.finish_cancelled()),
        };
        if self.is_detached() {
            return Ok(self.finish_cancelled());
        }

        // A capability missing from the results was not granted.
        let still_denied: Vec<String> = denied
            .into_iter()
            .filter(|id| !results.get(id).copied().unwrap_or(false))
            .collect();

        if still_denied.is_empty() {
            Ok(self.finish_granted())
        } else {
            self.finish_denied(
                bindings.dialogs.as_ref(),
                bindings.settings.as_ref(),
                still_denied,
            )
            .await
        }
    }

    /// Launch the OS prompt and wait for its results
    ///
    /// `Ok(None)` means the continuation was dropped by a screen teardown.
    /// The parked sender is removed on every exit, including when the caller
    /// drops the future while the prompt is open.
    async fn request_grants(
        &self,
        launcher: &dyn PermissionLauncher,
        denied: &[String],
    ) -> Result<Option<PromptResults>, PermissionError> {
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id.clone(), tx);
        let _parked = ParkedPrompt {
            pending: &self.pending,
            id: id.clone(),
        };

        // A teardown that ran before the insert found nothing to cancel.
        if self.is_detached() {
            debug!("Screen detached before prompt {} launched", id);
            return Ok(None);
        }

        let request = PermissionRequest {
            id: id.clone(),
            capabilities: denied.to_vec(),
        };
        debug!("Launching permission prompt {} for {:?}", id, denied);
        launcher.launch(&request)?;

        match rx.await {
            Ok(results) => Ok(Some(results)),
            Err(_) => {
                warn!("Permission prompt {} dropped before results arrived", id);
                Ok(None)
            }
        }
    }

    fn finish_granted(&self) -> NegotiationOutcome {
        self.set_state(NegotiationState::Granted);
        info!("All requested permissions granted");
        self.callback.on_permission_granted();
        NegotiationOutcome::Granted
    }

    fn finish_cancelled(&self) -> NegotiationOutcome {
        info!("Negotiation cancelled: hosting screen destroyed");
        NegotiationOutcome::Cancelled
    }

    async fn finish_denied(
        &self,
        dialogs: &dyn DialogPresenter,
        settings: &dyn SettingsNavigator,
        denied: Vec<String>,
    ) -> Result<NegotiationOutcome, PermissionError> {
        self.set_state(NegotiationState::Denied);
        let dialog = Dialog::denied(&self.config.denied, self.resolve(&denied));
        let choice = dialogs.show(dialog).await?;
        if self.is_detached() {
            return Ok(self.finish_cancelled());
        }

        let settings_opened = match choice {
            DialogChoice::Positive => {
                debug!("Opening app settings for {}", self.package_id);
                settings.open_app_settings(&self.package_id)?;
                true
            }
            DialogChoice::Negative => false,
        };

        info!(
            "Permissions denied: {:?} (settings opened: {})",
            denied, settings_opened
        );
        Ok(NegotiationOutcome::Denied {
            denied,
            settings_opened,
        })
    }
}

/// Builder for [`Negotiator`]
///
/// # Example
///
/// ```
/// use permission_access::prelude::*;
/// use permission_access::capability::manifest;
/// use std::sync::Arc;
///
/// let negotiator = Negotiator::builder()
///     .capabilities([manifest::CAMERA, manifest::RECORD_AUDIO])
///     .callback(|| {})
///     .config(NegotiationConfig::builder().title("Video Call").build())
///     .package_id("com.example.call")
///     .host(Arc::new(RecordingHost::new(34)))
///     .build()
///     .unwrap();
///
/// assert_eq!(negotiator.capabilities().len(), 2);
/// ```
#[derive(Default)]
pub struct NegotiatorBuilder {
    capabilities: Vec<String>,
    callback: Option<Arc<dyn PermissionCallback>>,
    config: Option<NegotiationConfig>,
    table: Option<Arc<CapabilityTable>>,
    package_id: Option<String>,
    bindings: Option<HostBindings>,
}

impl NegotiatorBuilder {
    /// Append capabilities to the requested set
    pub fn capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities
            .extend(capabilities.into_iter().map(Into::into));
        self
    }

    /// Append a single capability to the requested set
    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    /// Set the success callback
    pub fn callback(mut self, callback: impl PermissionCallback + 'static) -> Self {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Set dialog strings (defaults to [`NegotiationConfig::default`])
    pub fn config(mut self, config: NegotiationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the capability table (defaults to [`CapabilityTable::android`])
    pub fn table(mut self, table: CapabilityTable) -> Self {
        self.table = Some(Arc::new(table));
        self
    }

    /// Share a capability table already used by other negotiators
    pub fn shared_table(mut self, table: Arc<CapabilityTable>) -> Self {
        self.table = Some(table);
        self
    }

    /// Set the application package id used for the settings deep link
    pub fn package_id(mut self, package_id: impl Into<String>) -> Self {
        self.package_id = Some(package_id.into());
        self
    }

    /// Set the host collaborators
    pub fn bindings(mut self, bindings: HostBindings) -> Self {
        self.bindings = Some(bindings);
        self
    }

    /// Use one host value for every collaborator
    pub fn host<H>(self, host: Arc<H>) -> Self
    where
        H: PermissionOracle + PermissionLauncher + DialogPresenter + SettingsNavigator + 'static,
    {
        self.bindings(HostBindings::from_host(host))
    }

    /// Build the negotiator
    ///
    /// Duplicate capabilities are collapsed, keeping the first occurrence.
    pub fn build(self) -> Result<Negotiator, PermissionError> {
        let callback = self
            .callback
            .ok_or(PermissionError::MissingBinding("callback"))?;
        let package_id = self
            .package_id
            .ok_or(PermissionError::MissingBinding("package_id"))?;
        let bindings = self
            .bindings
            .ok_or(PermissionError::MissingBinding("host bindings"))?;

        let mut seen = HashSet::new();
        let capabilities = self
            .capabilities
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();

        Ok(Negotiator {
            capabilities,
            callback,
            config: self.config.unwrap_or_default(),
            table: self
                .table
                .unwrap_or_else(|| Arc::new(CapabilityTable::android())),
            package_id,
            bindings: RwLock::new(bindings),
            pending: PendingPrompts::new(),
            state: Mutex::new(NegotiationState::Idle),
            in_flight: AtomicBool::new(false),
            detached: AtomicBool::new(false),
        })
    }
}
