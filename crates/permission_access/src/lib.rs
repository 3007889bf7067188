//! permission_access - runtime permission negotiation for mobile hosts
//!
//! Given a set of requested capabilities, this crate works out which are
//! already granted, which need a rationale dialog first, and which need the
//! user to be routed to the system settings after a hard denial.
//!
//! # Overview
//!
//! The crate contains only the decision procedure. Everything that touches the
//! platform (grant status, the OS prompt, dialogs, settings navigation) is a
//! host collaborator reached through traits, so the state machine is testable
//! without a device.
//!
//! # Architecture
//!
//! - `capability`: Capability table (id → label, minimum platform version) and version filter
//! - `config`: Dialog strings for the rationale and denied phases
//! - `host`: Traits the hosting screen implements, plus a scripted `RecordingHost`
//! - `callback`: The success callback
//! - `negotiation`: The `Negotiator` state machine
//! - `error`: Error types
//!
//! # Example
//!
//! ```rust
//! use permission_access::prelude::*;
//! use permission_access::capability::manifest;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), PermissionError> {
//!     let host = Arc::new(RecordingHost::new(34));
//!     host.require_rationale(manifest::CAMERA);
//!     // Rationale: "Grant", then denied dialog: "Cancel"
//!     host.answer_dialogs([DialogChoice::Positive, DialogChoice::Negative]);
//!
//!     let negotiator = Arc::new(
//!         Negotiator::builder()
//!             .capabilities([manifest::CAMERA, manifest::RECORD_AUDIO])
//!             .callback(|| println!("Camera and microphone ready"))
//!             .package_id("com.example.call")
//!             .host(host.clone())
//!             .build()?,
//!     );
//!
//!     let task = {
//!         let negotiator = negotiator.clone();
//!         tokio::spawn(async move { negotiator.ensure_granted().await })
//!     };
//!
//!     // The host's OS prompt answers asynchronously
//!     let request = host.next_request().await.expect("prompt launched");
//!     let results = [
//!         (manifest::CAMERA.to_string(), true),
//!         (manifest::RECORD_AUDIO.to_string(), false),
//!     ]
//!     .into_iter()
//!     .collect();
//!     negotiator.on_permission_result(&request.id, results).await;
//!
//!     let outcome = task.await.expect("negotiation task")?;
//!     assert!(!outcome.is_granted());
//!     Ok(())
//! }
//! ```
//!
//! # License
//!
//! Licensed under MIT. See LICENSE file for details.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Capability table and platform-version filter
///
/// `CapabilityTable` maps permission identifiers to display labels and an
/// optional minimum platform version. `CapabilityTable::android()` ships the
/// Android runtime permissions; applications layer their own entries on top.
pub mod capability;

/// Dialog strings
///
/// `NegotiationConfig` holds title, body, and button labels for the rationale
/// and denied dialogs, with generic English defaults.
pub mod config;

/// Host platform bindings
///
/// Traits implemented by the hosting screen:
///
/// - `PermissionOracle` - grant status, rationale heuristic, platform version
/// - `PermissionLauncher` - the OS permission prompt
/// - `DialogPresenter` - modal dialogs
/// - `SettingsNavigator` - app settings deep link
pub mod host;

/// Success callback
pub mod callback;

/// The negotiation state machine
///
/// `Negotiator::ensure_granted()` runs one negotiation and returns a
/// `NegotiationOutcome`: `Granted`, `Denied`, or `Cancelled`.
pub mod negotiation;

/// Error types
///
/// This module defines the `PermissionError` enum. Denials are outcomes, not
/// errors; errors cover misuse of the negotiator and host platform failures.
pub mod error;

// Prelude module for common imports
pub mod prelude {
    //! Common imports for permission_access users
    //!
    //! Use `use permission_access::prelude::*;` to import commonly used types.

    pub use crate::callback::PermissionCallback;
    pub use crate::capability::{Capability, CapabilityInfo, CapabilityTable};
    pub use crate::config::{DialogText, NegotiationConfig};
    pub use crate::error::PermissionError;
    pub use crate::host::{
        Dialog, DialogChoice, DialogKind, DialogPresenter, HostBindings, PermissionLauncher,
        PermissionOracle, PermissionRequest, RecordingHost, SettingsNavigator,
    };
    pub use crate::negotiation::{
        NegotiationOutcome, NegotiationState, Negotiator, NegotiatorBuilder, PromptResults,
    };
}
