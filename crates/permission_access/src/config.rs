//! User-facing strings for the negotiation dialogs
//!
//! [`NegotiationConfig`] holds the text for the two dialog phases: the
//! rationale dialog shown before re-requesting a previously denied permission,
//! and the terminal denied dialog that offers a link to the app settings.
//! Every field has a generic English default, so the config may be omitted.
//!
//! # Example
//!
//! ```
//! use permission_access::config::NegotiationConfig;
//!
//! let config = NegotiationConfig::builder()
//!     .title("Notification Access")
//!     .message("This app requires notification access to function properly.")
//!     .denied_title("Notification Access Denied")
//!     .denied_message("Notification access is essential. Please enable it in settings.")
//!     .build();
//!
//! assert_eq!(config.rationale.positive_button, "Grant");
//! assert_eq!(config.denied.positive_button, "Go to Settings");
//! ```
//!
//! # Loading from JSON
//!
//! Missing fields keep their defaults:
//!
//! ```
//! use permission_access::config::NegotiationConfig;
//!
//! let config = NegotiationConfig::from_json(r#"{
//!     "rationale": { "title": "Camera Needed" }
//! }"#).unwrap();
//!
//! assert_eq!(config.rationale.title, "Camera Needed");
//! assert_eq!(config.rationale.negative_button, "Cancel");
//! assert_eq!(config.denied.title, "Permission Denied");
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PermissionError;

/// Text for one dialog phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogText {
    /// Dialog title
    pub title: String,
    /// Dialog body
    pub message: String,
    /// Label of the positive (confirming) button
    pub positive_button: String,
    /// Label of the negative (dismissing) button
    pub negative_button: String,
}

impl DialogText {
    fn rationale_default() -> Self {
        Self {
            title: "Permissions Required".to_string(),
            message: "This app requires the following permissions:".to_string(),
            positive_button: "Grant".to_string(),
            negative_button: "Cancel".to_string(),
        }
    }

    fn denied_default() -> Self {
        Self {
            title: "Permission Denied".to_string(),
            message: "Some permissions are essential. Please enable them in settings.".to_string(),
            positive_button: "Go to Settings".to_string(),
            negative_button: "Cancel".to_string(),
        }
    }
}

/// Dialog strings for both negotiation phases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationConfig {
    /// Rationale phase, shown before re-requesting previously denied capabilities
    #[serde(default = "DialogText::rationale_default", deserialize_with = "rationale_text")]
    pub rationale: DialogText,
    /// Denied phase, shown when the negotiation ends without every grant
    #[serde(default = "DialogText::denied_default", deserialize_with = "denied_text")]
    pub denied: DialogText,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            rationale: DialogText::rationale_default(),
            denied: DialogText::denied_default(),
        }
    }
}

/// Partially specified [`DialogText`], filled from a phase default
#[derive(Debug, Default, Deserialize)]
struct PartialDialogText {
    title: Option<String>,
    message: Option<String>,
    positive_button: Option<String>,
    negative_button: Option<String>,
}

impl PartialDialogText {
    fn fill(self, defaults: DialogText) -> DialogText {
        DialogText {
            title: self.title.unwrap_or(defaults.title),
            message: self.message.unwrap_or(defaults.message),
            positive_button: self.positive_button.unwrap_or(defaults.positive_button),
            negative_button: self.negative_button.unwrap_or(defaults.negative_button),
        }
    }
}

fn rationale_text<'de, D>(deserializer: D) -> Result<DialogText, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(PartialDialogText::deserialize(deserializer)?.fill(DialogText::rationale_default()))
}

fn denied_text<'de, D>(deserializer: D) -> Result<DialogText, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(PartialDialogText::deserialize(deserializer)?.fill(DialogText::denied_default()))
}

impl NegotiationConfig {
    /// Create a new config builder seeded with the defaults
    pub fn builder() -> NegotiationConfigBuilder {
        NegotiationConfigBuilder::default()
    }

    /// Parse a config from JSON
    pub fn from_json(json: &str) -> Result<Self, PermissionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PermissionError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Builder for [`NegotiationConfig`]
///
/// Unset fields keep the generic English defaults.
#[derive(Debug, Default)]
pub struct NegotiationConfigBuilder {
    inner: NegotiationConfig,
}

impl NegotiationConfigBuilder {
    /// Set rationale dialog title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.inner.rationale.title = title.into();
        self
    }

    /// Set rationale dialog body (the capability list is appended below it)
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.inner.rationale.message = message.into();
        self
    }

    /// Set rationale dialog positive button label
    pub fn positive_button(mut self, label: impl Into<String>) -> Self {
        self.inner.rationale.positive_button = label.into();
        self
    }

    /// Set rationale dialog negative button label
    pub fn negative_button(mut self, label: impl Into<String>) -> Self {
        self.inner.rationale.negative_button = label.into();
        self
    }

    /// Set denied dialog title
    pub fn denied_title(mut self, title: impl Into<String>) -> Self {
        self.inner.denied.title = title.into();
        self
    }

    /// Set denied dialog body
    pub fn denied_message(mut self, message: impl Into<String>) -> Self {
        self.inner.denied.message = message.into();
        self
    }

    /// Set denied dialog positive ("go to settings") button label
    pub fn denied_positive_button(mut self, label: impl Into<String>) -> Self {
        self.inner.denied.positive_button = label.into();
        self
    }

    /// Set denied dialog negative button label
    pub fn denied_negative_button(mut self, label: impl Into<String>) -> Self {
        self.inner.denied.negative_button = label.into();
        self
    }

    /// Build the config
    pub fn build(self) -> NegotiationConfig {
        self.inner
    }
}
