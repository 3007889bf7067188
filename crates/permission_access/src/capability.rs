//! Capability table and platform-version filter
//!
//! A capability is an opaque permission identifier such as
//! `"android.permission.CAMERA"`. The [`CapabilityTable`] maps identifiers to a
//! human-readable label and an optional minimum platform version. It is plain
//! configuration data: new platform releases are supported by adding entries,
//! never by touching the negotiation logic.
//!
//! # Example
//!
//! ```
//! use permission_access::capability::{api_level, manifest, CapabilityTable};
//!
//! let table = CapabilityTable::android()
//!     .with_capability("com.vendor.SCANNER", "Barcode Scanner", None);
//!
//! assert_eq!(table.label_for(manifest::CAMERA), "Camera");
//! assert_eq!(table.label_for("com.vendor.SCANNER"), "Barcode Scanner");
//! assert_eq!(table.label_for("com.vendor.CUSTOM"), "com.vendor.CUSTOM");
//!
//! assert!(!table.is_supported(manifest::READ_MEDIA_IMAGES, api_level::S));
//! assert!(table.is_supported(manifest::READ_MEDIA_IMAGES, api_level::TIRAMISU));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::PermissionError;

/// Android runtime permission identifiers known to the built-in table
pub mod manifest {
    #![allow(missing_docs)]

    pub const CAMERA: &str = "android.permission.CAMERA";
    pub const RECORD_AUDIO: &str = "android.permission.RECORD_AUDIO";
    pub const READ_CONTACTS: &str = "android.permission.READ_CONTACTS";
    pub const WRITE_CONTACTS: &str = "android.permission.WRITE_CONTACTS";
    pub const GET_ACCOUNTS: &str = "android.permission.GET_ACCOUNTS";
    pub const ACCESS_FINE_LOCATION: &str = "android.permission.ACCESS_FINE_LOCATION";
    pub const ACCESS_COARSE_LOCATION: &str = "android.permission.ACCESS_COARSE_LOCATION";
    pub const READ_EXTERNAL_STORAGE: &str = "android.permission.READ_EXTERNAL_STORAGE";
    pub const WRITE_EXTERNAL_STORAGE: &str = "android.permission.WRITE_EXTERNAL_STORAGE";
    pub const BLUETOOTH: &str = "android.permission.BLUETOOTH";
    pub const BLUETOOTH_ADMIN: &str = "android.permission.BLUETOOTH_ADMIN";
    pub const NFC: &str = "android.permission.NFC";
    pub const INTERNET: &str = "android.permission.INTERNET";
    pub const ACCESS_NETWORK_STATE: &str = "android.permission.ACCESS_NETWORK_STATE";
    pub const ACCESS_WIFI_STATE: &str = "android.permission.ACCESS_WIFI_STATE";
    pub const CHANGE_WIFI_STATE: &str = "android.permission.CHANGE_WIFI_STATE";
    pub const SEND_SMS: &str = "android.permission.SEND_SMS";
    pub const RECEIVE_SMS: &str = "android.permission.RECEIVE_SMS";
    pub const READ_SMS: &str = "android.permission.READ_SMS";
    pub const READ_PHONE_STATE: &str = "android.permission.READ_PHONE_STATE";
    pub const CALL_PHONE: &str = "android.permission.CALL_PHONE";
    pub const READ_CALL_LOG: &str = "android.permission.READ_CALL_LOG";
    pub const BODY_SENSORS: &str = "android.permission.BODY_SENSORS";
    pub const ACCESS_BACKGROUND_LOCATION: &str = "android.permission.ACCESS_BACKGROUND_LOCATION";
    pub const ACTIVITY_RECOGNITION: &str = "android.permission.ACTIVITY_RECOGNITION";
    pub const BLUETOOTH_CONNECT: &str = "android.permission.BLUETOOTH_CONNECT";
    pub const BLUETOOTH_SCAN: &str = "android.permission.BLUETOOTH_SCAN";
    pub const READ_MEDIA_IMAGES: &str = "android.permission.READ_MEDIA_IMAGES";
    pub const READ_MEDIA_VIDEO: &str = "android.permission.READ_MEDIA_VIDEO";
    pub const READ_MEDIA_AUDIO: &str = "android.permission.READ_MEDIA_AUDIO";
    pub const POST_NOTIFICATIONS: &str = "android.permission.POST_NOTIFICATIONS";
    pub const FOREGROUND_SERVICE: &str = "android.permission.FOREGROUND_SERVICE";
    pub const FOREGROUND_SERVICE_MEDIA_PROJECTION: &str =
        "android.permission.FOREGROUND_SERVICE_MEDIA_PROJECTION";
    pub const FOREGROUND_SERVICE_LOCATION: &str = "android.permission.FOREGROUND_SERVICE_LOCATION";
}

/// Android API levels used to gate capabilities
pub mod api_level {
    /// Android 9
    pub const P: u32 = 28;
    /// Android 10
    pub const Q: u32 = 29;
    /// Android 12
    pub const S: u32 = 31;
    /// Android 13
    pub const TIRAMISU: u32 = 33;
    /// Android 14
    pub const UPSIDE_DOWN_CAKE: u32 = 34;
}

/// (id, label, minimum platform version)
const ANDROID_CAPABILITIES: &[(&str, &str, Option<u32>)] = &[
    (manifest::CAMERA, "Camera", None),
    (manifest::RECORD_AUDIO, "Microphone", None),
    (manifest::READ_CONTACTS, "Read Contacts", None),
    (manifest::WRITE_CONTACTS, "Write Contacts", None),
    (manifest::GET_ACCOUNTS, "Get Accounts", None),
    (manifest::ACCESS_FINE_LOCATION, "Fine Location", None),
    (manifest::ACCESS_COARSE_LOCATION, "Coarse Location", None),
    (manifest::READ_EXTERNAL_STORAGE, "Read External Storage", None),
    (manifest::WRITE_EXTERNAL_STORAGE, "Write External Storage", None),
    (manifest::BLUETOOTH, "Bluetooth", None),
    (manifest::BLUETOOTH_ADMIN, "Bluetooth Admin", None),
    (manifest::NFC, "NFC", None),
    (manifest::INTERNET, "Internet", None),
    (manifest::ACCESS_NETWORK_STATE, "Access Network State", None),
    (manifest::ACCESS_WIFI_STATE, "Access WiFi State", None),
    (manifest::CHANGE_WIFI_STATE, "Change WiFi State", None),
    (manifest::SEND_SMS, "Send SMS", None),
    (manifest::RECEIVE_SMS, "Receive SMS", None),
    (manifest::READ_SMS, "Read SMS", None),
    (manifest::READ_PHONE_STATE, "Read Phone State", None),
    (manifest::CALL_PHONE, "Call Phone", None),
    (manifest::READ_CALL_LOG, "Read Call Log", None),
    (manifest::BODY_SENSORS, "Body Sensors", None),
    (manifest::ACCESS_BACKGROUND_LOCATION, "Background Location", Some(api_level::Q)),
    (manifest::ACTIVITY_RECOGNITION, "Activity Recognition", Some(api_level::Q)),
    (manifest::BLUETOOTH_CONNECT, "Bluetooth Connect", Some(api_level::S)),
    (manifest::BLUETOOTH_SCAN, "Bluetooth Scan", Some(api_level::S)),
    (manifest::READ_MEDIA_IMAGES, "Read Media Images", Some(api_level::TIRAMISU)),
    (manifest::READ_MEDIA_VIDEO, "Read Media Video", Some(api_level::TIRAMISU)),
    (manifest::READ_MEDIA_AUDIO, "Read Media Audio", Some(api_level::TIRAMISU)),
    (manifest::POST_NOTIFICATIONS, "Post Notifications", Some(api_level::TIRAMISU)),
    (manifest::FOREGROUND_SERVICE, "Foreground Service", Some(api_level::P)),
    (
        manifest::FOREGROUND_SERVICE_MEDIA_PROJECTION,
        "Foreground Service Media Projection",
        Some(api_level::UPSIDE_DOWN_CAKE),
    ),
    (
        manifest::FOREGROUND_SERVICE_LOCATION,
        "Foreground Service Location",
        Some(api_level::UPSIDE_DOWN_CAKE),
    ),
];

/// Table entry for a single capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityInfo {
    /// Human-readable label shown in dialogs
    pub label: String,
    /// Lowest platform version on which the capability exists (`None` = always)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_platform_version: Option<u32>,
}

/// A capability identifier resolved against a [`CapabilityTable`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Raw identifier
    pub id: String,
    /// Resolved label, or the raw identifier when the table has no entry
    pub label: String,
    /// Minimum platform version, if any
    pub min_platform_version: Option<u32>,
}

/// Immutable mapping from capability identifier to label and minimum version
///
/// Assembled once (typically from [`CapabilityTable::android`] plus
/// application-specific entries) and shared read-only by negotiators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityTable {
    entries: HashMap<String, CapabilityInfo>,
}

impl CapabilityTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in Android runtime permission table
    pub fn android() -> Self {
        let entries = ANDROID_CAPABILITIES
            .iter()
            .map(|(id, label, min)| {
                (
                    id.to_string(),
                    CapabilityInfo {
                        label: label.to_string(),
                        min_platform_version: *min,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Parse a table from JSON
    ///
    /// The JSON document is an object keyed by capability identifier:
    ///
    /// ```
    /// use permission_access::capability::CapabilityTable;
    ///
    /// let table = CapabilityTable::from_json(r#"{
    ///     "com.vendor.SCANNER": { "label": "Barcode Scanner" },
    ///     "com.vendor.LIDAR": { "label": "Lidar", "min_platform_version": 35 }
    /// }"#).unwrap();
    ///
    /// assert_eq!(table.label_for("com.vendor.SCANNER"), "Barcode Scanner");
    /// assert!(!table.is_supported("com.vendor.LIDAR", 34));
    /// ```
    pub fn from_json(json: &str) -> Result<Self, PermissionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a table from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PermissionError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Return a copy of this table with entries from `json` layered on top
    pub fn merge_json(self, json: &str) -> Result<Self, PermissionError> {
        Ok(self.extend(Self::from_json(json)?))
    }

    /// Add or replace a single entry
    pub fn with_capability(
        mut self,
        id: impl Into<String>,
        label: impl Into<String>,
        min_platform_version: Option<u32>,
    ) -> Self {
        self.entries.insert(
            id.into(),
            CapabilityInfo {
                label: label.into(),
                min_platform_version,
            },
        );
        self
    }

    /// Layer another table on top of this one; entries in `other` win
    pub fn extend(mut self, other: CapabilityTable) -> Self {
        self.entries.extend(other.entries);
        self
    }

    /// Human-readable label for a capability, falling back to the raw id
    pub fn label_for<'a>(&'a self, id: &'a str) -> &'a str {
        self.entries
            .get(id)
            .map(|info| info.label.as_str())
            .unwrap_or(id)
    }

    /// Minimum platform version for a capability, if it has one
    pub fn min_platform_version(&self, id: &str) -> Option<u32> {
        self.entries.get(id).and_then(|info| info.min_platform_version)
    }

    /// Whether a capability exists on the given platform version
    ///
    /// Capabilities without a minimum version (including ids absent from the
    /// table) are always supported.
    pub fn is_supported(&self, id: &str, platform_version: u32) -> bool {
        match self.min_platform_version(id) {
            Some(min) => platform_version >= min,
            None => true,
        }
    }

    /// Resolve an identifier into a [`Capability`]
    pub fn resolve(&self, id: &str) -> Capability {
        Capability {
            id: id.to_string(),
            label: self.label_for(id).to_string(),
            min_platform_version: self.min_platform_version(id),
        }
    }

    /// Whether the table has an entry for `id`
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_android_table_labels() {
        let table = CapabilityTable::android();
        assert_eq!(table.label_for(manifest::CAMERA), "Camera");
        assert_eq!(table.label_for(manifest::RECORD_AUDIO), "Microphone");
        assert_eq!(
            table.label_for(manifest::POST_NOTIFICATIONS),
            "Post Notifications"
        );
        assert_eq!(table.len(), ANDROID_CAPABILITIES.len());
    }

    #[test]
    fn test_unknown_id_falls_back_to_raw_id() {
        let table = CapabilityTable::android();
        assert_eq!(table.label_for("com.vendor.CUSTOM"), "com.vendor.CUSTOM");
        assert!(!table.contains("com.vendor.CUSTOM"));
    }

    #[test]
    fn test_unversioned_always_supported() {
        let table = CapabilityTable::android();
        assert!(table.is_supported(manifest::CAMERA, 1));
        assert!(table.is_supported("com.vendor.CUSTOM", 1));
    }

    #[test]
    fn test_version_boundary() {
        let table = CapabilityTable::android();

        assert!(!table.is_supported(manifest::BLUETOOTH_SCAN, api_level::S - 1));
        assert!(table.is_supported(manifest::BLUETOOTH_SCAN, api_level::S));

        assert!(!table.is_supported(manifest::ACTIVITY_RECOGNITION, api_level::Q - 1));
        assert!(table.is_supported(manifest::ACTIVITY_RECOGNITION, api_level::Q));

        assert!(!table.is_supported(
            manifest::FOREGROUND_SERVICE_LOCATION,
            api_level::UPSIDE_DOWN_CAKE - 1
        ));
        assert!(table.is_supported(
            manifest::FOREGROUND_SERVICE_LOCATION,
            api_level::UPSIDE_DOWN_CAKE
        ));
    }

    #[test]
    fn test_with_capability_overrides() {
        let table = CapabilityTable::android().with_capability(manifest::CAMERA, "Camera (rear)", None);
        assert_eq!(table.label_for(manifest::CAMERA), "Camera (rear)");
    }

    #[test]
    fn test_merge_json_layers_on_top() {
        let table = CapabilityTable::android()
            .merge_json(
                r#"{
                    "android.permission.RECORD_AUDIO": { "label": "Voice Notes" },
                    "com.vendor.LIDAR": { "label": "Lidar", "min_platform_version": 35 }
                }"#,
            )
            .unwrap();

        assert_eq!(table.label_for(manifest::RECORD_AUDIO), "Voice Notes");
        assert_eq!(table.min_platform_version("com.vendor.LIDAR"), Some(35));
        assert!(table.contains(manifest::CAMERA));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let err = CapabilityTable::from_json(r#"{ "x": { "lbl": 1 } }"#).unwrap_err();
        assert!(matches!(err, PermissionError::ConfigDecode(_)));
    }

    #[test]
    fn test_resolve() {
        let table = CapabilityTable::android();
        let cap = table.resolve(manifest::READ_MEDIA_VIDEO);
        assert_eq!(cap.label, "Read Media Video");
        assert_eq!(cap.min_platform_version, Some(api_level::TIRAMISU));

        let unknown = table.resolve("com.vendor.CUSTOM");
        assert_eq!(unknown.label, "com.vendor.CUSTOM");
        assert_eq!(unknown.min_platform_version, None);
    }

    #[test]
    fn test_serialize_round_trip_preserves_entries() {
        let table = CapabilityTable::new().with_capability("a.B", "B", Some(30));
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(CapabilityTable::from_json(&json).unwrap(), table);
    }
}
