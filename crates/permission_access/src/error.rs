//! Error types for permission negotiation
//!
//! This module defines the error hierarchy for the permission_access crate using `thiserror`.
//! All fallible operations return `Result<T, PermissionError>`.
//!
//! A negotiation that ends with the user refusing a permission is *not* an error; it is
//! reported as [`NegotiationOutcome::Denied`](crate::negotiation::NegotiationOutcome::Denied).
//! Errors are reserved for misuse of the negotiator and for failures of the host platform.
//!
//! # Error Variants
//!
//! - [`PermissionError::NegotiationInProgress`]: `ensure_granted` called while one is pending
//! - [`PermissionError::ScreenDetached`]: the hosting screen was destroyed and not re-bound
//! - [`PermissionError::HostQuery`]: a grant-status or rationale query failed on the host
//! - [`PermissionError::Launch`]: the host could not launch the OS permission prompt
//! - [`PermissionError::Dialog`]: the host could not present a modal dialog
//! - [`PermissionError::Settings`]: the host could not open the app settings screen
//! - [`PermissionError::MissingBinding`]: the negotiator was built without a host collaborator
//! - [`PermissionError::ConfigDecode`]: configuration JSON failed to parse
//! - [`PermissionError::Io`]: configuration file could not be read
//!
//! # Example
//!
//! ```rust
//! use permission_access::error::PermissionError;
//!
//! fn check_camera() -> Result<bool, PermissionError> {
//!     Err(PermissionError::host_query(
//!         "android.permission.CAMERA",
//!         "package manager unavailable",
//!     ))
//! }
//!
//! assert!(matches!(check_camera(), Err(PermissionError::HostQuery { .. })));
//! ```

use thiserror::Error;

/// The main error type for all permission_access operations
///
/// Two variants support automatic conversion via the `?` operator:
/// - `ConfigDecode` from `serde_json::Error`
/// - `Io` from `std::io::Error`
#[derive(Error, Debug)]
pub enum PermissionError {
    /// A negotiation is already pending on this negotiator
    ///
    /// Only one negotiation may run per negotiator at a time. The pending
    /// negotiation is left untouched.
    #[error("A permission negotiation is already in progress")]
    NegotiationInProgress,

    /// The hosting screen was destroyed
    ///
    /// Call [`Negotiator::rebind`](crate::negotiation::Negotiator::rebind) with the
    /// recreated screen's bindings before negotiating again.
    #[error("The hosting screen was destroyed; rebind the negotiator before requesting permissions")]
    ScreenDetached,

    /// A host grant-status or rationale query failed
    ///
    /// This is distinct from a capability being denied: it signals that the
    /// platform could not answer at all.
    #[error("Host query for {capability} failed: {reason}")]
    HostQuery {
        /// Capability identifier that was being queried
        capability: String,
        /// Platform-provided failure description
        reason: String,
    },

    /// The OS permission prompt could not be launched
    #[error("Failed to launch permission prompt: {0}")]
    Launch(String),

    /// A modal dialog could not be presented
    #[error("Failed to present dialog: {0}")]
    Dialog(String),

    /// The application settings screen could not be opened
    #[error("Failed to open app settings: {0}")]
    Settings(String),

    /// The negotiator builder was missing a required host binding
    #[error("Negotiator is missing required binding: {0}")]
    MissingBinding(&'static str),

    /// Failed to parse configuration JSON
    #[error("Failed to parse configuration: {0}")]
    ConfigDecode(#[from] serde_json::Error),

    /// I/O operation failed while loading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PermissionError {
    /// Construct a [`PermissionError::HostQuery`] for a capability
    pub fn host_query(capability: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::HostQuery {
            capability: capability.into(),
            reason: reason.into(),
        }
    }
}
