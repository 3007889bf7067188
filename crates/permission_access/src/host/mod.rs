//! Host platform bindings
//!
//! The negotiator never talks to the operating system directly. Everything
//! platform-specific is reached through the traits in this module, which the
//! hosting screen implements:
//!
//! - [`PermissionOracle`] - Grant status, rationale heuristic, platform version
//! - [`PermissionLauncher`] - Launch the OS multi-permission prompt
//! - [`DialogPresenter`] - Present a non-cancelable modal dialog
//! - [`SettingsNavigator`] - Deep-link into the per-app settings screen
//!
//! The four are bundled in [`HostBindings`]. A single type may implement all
//! of them; [`HostBindings::from_host`] wires such a type into every slot.
//!
//! # Example
//!
//! ```
//! use permission_access::error::PermissionError;
//! use permission_access::host::PermissionOracle;
//!
//! struct Preflight {
//!     api_level: u32,
//! }
//!
//! impl PermissionOracle for Preflight {
//!     fn platform_version(&self) -> u32 {
//!         self.api_level
//!     }
//!
//!     fn is_granted(&self, capability: &str) -> Result<bool, PermissionError> {
//!         Ok(capability == "android.permission.INTERNET")
//!     }
//!
//!     fn should_show_rationale(&self, _capability: &str) -> Result<bool, PermissionError> {
//!         Ok(false)
//!     }
//! }
//! ```

pub mod recording;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::capability::Capability;
use crate::config::DialogText;
use crate::error::PermissionError;

pub use recording::RecordingHost;

/// Synchronous permission-status queries answered by the host OS
///
/// Errors returned here abort the negotiation and reach the caller unchanged;
/// they are never interpreted as a denial.
pub trait PermissionOracle: Send + Sync {
    /// Current platform version (e.g. Android API level)
    fn platform_version(&self) -> u32;

    /// Whether the capability is currently granted
    fn is_granted(&self, capability: &str) -> Result<bool, PermissionError>;

    /// Whether the OS recommends showing a rationale before re-requesting
    ///
    /// On Android this is true when the user denied the permission before
    /// without selecting "don't ask again".
    fn should_show_rationale(&self, capability: &str) -> Result<bool, PermissionError>;
}

/// A single launch of the OS permission prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRequest {
    /// Unique request id; pass it back to
    /// [`Negotiator::on_permission_result`](crate::negotiation::Negotiator::on_permission_result)
    pub id: String,
    /// Capability identifiers to prompt for
    pub capabilities: Vec<String>,
}

/// Launches the OS multi-permission prompt
///
/// `launch` must return immediately. The host delivers the user's answer later
/// through [`Negotiator::on_permission_result`](crate::negotiation::Negotiator::on_permission_result)
/// using the request's `id`.
pub trait PermissionLauncher: Send + Sync {
    /// Show the OS prompt for `request.capabilities`
    fn launch(&self, request: &PermissionRequest) -> Result<(), PermissionError>;
}

/// Which negotiation phase a dialog belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogKind {
    /// Explains why previously denied capabilities are needed
    Rationale,
    /// Terminal failure dialog offering the settings screen
    Denied,
}

/// Button the user pressed in a modal dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogChoice {
    /// Positive button ("Grant", "Go to Settings")
    Positive,
    /// Negative button ("Cancel")
    Negative,
}

/// A modal dialog the negotiator asks the host to present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    /// Negotiation phase
    pub kind: DialogKind,
    /// Title text
    pub title: String,
    /// Body text, ready to display
    pub message: String,
    /// Positive button label
    pub positive_button: String,
    /// Negative button label
    pub negative_button: String,
    /// Whether back-press or outside taps may dismiss the dialog (always `false`)
    pub cancelable: bool,
    /// Capabilities the dialog is about, for hosts that render custom layouts
    pub capabilities: Vec<Capability>,
}

impl Dialog {
    /// Rationale dialog; the body lists the capability labels one per line
    pub(crate) fn rationale(text: &DialogText, capabilities: Vec<Capability>) -> Self {
        let list = capabilities
            .iter()
            .map(|c| c.label.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            kind: DialogKind::Rationale,
            title: text.title.clone(),
            message: format!("{}\n\n{}", text.message, list),
            positive_button: text.positive_button.clone(),
            negative_button: text.negative_button.clone(),
            cancelable: false,
            capabilities,
        }
    }

    /// Denied dialog; the body is the configured message as-is
    pub(crate) fn denied(text: &DialogText, capabilities: Vec<Capability>) -> Self {
        Self {
            kind: DialogKind::Denied,
            title: text.title.clone(),
            message: text.message.clone(),
            positive_button: text.positive_button.clone(),
            negative_button: text.negative_button.clone(),
            cancelable: false,
            capabilities,
        }
    }
}

/// Presents modal dialogs
///
/// `show` resolves once the user presses one of the two buttons. There is no
/// third dismissal path; implementations must honor `dialog.cancelable == false`.
#[async_trait]
pub trait DialogPresenter: Send + Sync {
    /// Present the dialog and wait for the user's choice
    async fn show(&self, dialog: Dialog) -> Result<DialogChoice, PermissionError>;
}

/// Navigates to the OS per-app settings screen
pub trait SettingsNavigator: Send + Sync {
    /// Open the settings screen for `package_id`
    fn open_app_settings(&self, package_id: &str) -> Result<(), PermissionError>;
}

/// Registry of the host collaborators a negotiator needs
///
/// Cloning is cheap; every binding is reference counted.
#[derive(Clone)]
pub struct HostBindings {
    pub(crate) oracle: Arc<dyn PermissionOracle>,
    pub(crate) launcher: Arc<dyn PermissionLauncher>,
    pub(crate) dialogs: Arc<dyn DialogPresenter>,
    pub(crate) settings: Arc<dyn SettingsNavigator>,
}

impl std::fmt::Debug for HostBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostBindings").finish_non_exhaustive()
    }
}

impl HostBindings {
    /// Bundle individual collaborators
    pub fn new(
        oracle: Arc<dyn PermissionOracle>,
        launcher: Arc<dyn PermissionLauncher>,
        dialogs: Arc<dyn DialogPresenter>,
        settings: Arc<dyn SettingsNavigator>,
    ) -> Self {
        Self {
            oracle,
            launcher,
            dialogs,
            settings,
        }
    }

    /// Use one value for every binding
    ///
    /// ```
    /// use permission_access::host::{HostBindings, RecordingHost};
    /// use std::sync::Arc;
    ///
    /// let host = Arc::new(RecordingHost::new(34));
    /// let bindings = HostBindings::from_host(host);
    /// ```
    pub fn from_host<H>(host: Arc<H>) -> Self
    where
        H: PermissionOracle + PermissionLauncher + DialogPresenter + SettingsNavigator + 'static,
    {
        Self {
            oracle: host.clone(),
            launcher: host.clone(),
            dialogs: host.clone(),
            settings: host,
        }
    }
}
