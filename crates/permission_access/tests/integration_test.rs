//! Integration tests for permission_access
//!
//! These tests drive complete negotiations through `RecordingHost`, which
//! scripts grant status, rationale flags, and dialog answers, and records every
//! dialog, prompt launch, and settings navigation.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test integration
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use permission_access::capability::{api_level, manifest};
use permission_access::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

struct Screen {
    host: Arc<RecordingHost>,
    negotiator: Arc<Negotiator>,
    granted_calls: Arc<AtomicUsize>,
}

fn screen(platform_version: u32, capabilities: &[&str]) -> Screen {
    screen_with_config(platform_version, capabilities, None)
}

fn screen_with_config(
    platform_version: u32,
    capabilities: &[&str],
    config: Option<NegotiationConfig>,
) -> Screen {
    let host = Arc::new(RecordingHost::new(platform_version));
    let granted_calls = Arc::new(AtomicUsize::new(0));
    let calls = granted_calls.clone();

    let mut builder = Negotiator::builder()
        .capabilities(capabilities.iter().copied())
        .callback(move || {
            calls.fetch_add(1, Ordering::SeqCst);
        })
        .package_id("com.morg.permission")
        .host(host.clone());
    if let Some(config) = config {
        builder = builder.config(config);
    }

    Screen {
        host,
        negotiator: Arc::new(builder.build().unwrap()),
        granted_calls,
    }
}

fn results(pairs: &[(&str, bool)]) -> PromptResults {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Run `ensure_granted` in the background, answer the first OS prompt with
/// `answers`, and return the outcome together with the prompt that was shown.
async fn negotiate_with_prompt(
    screen: &Screen,
    answers: &[(&str, bool)],
) -> (NegotiationOutcome, PermissionRequest) {
    let negotiator = screen.negotiator.clone();
    let task = tokio::spawn(async move { negotiator.ensure_granted().await });

    let request = screen.host.next_request().await.unwrap();
    assert!(
        screen
            .negotiator
            .on_permission_result(&request.id, results(answers))
            .await
    );

    (task.await.unwrap().unwrap(), request)
}

// ============================================================================
// Granted Paths
// ============================================================================

#[tokio::test]
async fn test_notifications_already_granted() {
    let s = screen(api_level::TIRAMISU, &[manifest::POST_NOTIFICATIONS]);
    s.host.grant(manifest::POST_NOTIFICATIONS);

    let outcome = s.negotiator.ensure_granted().await.unwrap();

    assert_eq!(outcome, NegotiationOutcome::Granted);
    assert_eq!(s.granted_calls.load(Ordering::SeqCst), 1);
    assert!(s.host.dialogs().is_empty());
    assert!(s.host.requests().is_empty());
}

#[tokio::test]
async fn test_empty_after_filtering_behaves_like_all_granted() {
    // Every capability requires a newer platform than the device has
    let s = screen(
        api_level::Q - 1,
        &[
            manifest::ACCESS_BACKGROUND_LOCATION,
            manifest::ACTIVITY_RECOGNITION,
            manifest::BLUETOOTH_SCAN,
        ],
    );

    let outcome = s.negotiator.ensure_granted().await.unwrap();

    assert!(outcome.is_granted());
    assert_eq!(s.granted_calls.load(Ordering::SeqCst), 1);
    assert!(s.host.dialogs().is_empty());
    assert!(s.host.requests().is_empty());
}

#[tokio::test]
async fn test_empty_capability_set_fires_callback() {
    let s = screen(api_level::UPSIDE_DOWN_CAKE, &[]);
    assert!(s.negotiator.ensure_granted().await.unwrap().is_granted());
    assert_eq!(s.granted_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_prompt_without_rationale_all_granted() {
    let s = screen(34, &[manifest::CAMERA, manifest::ACCESS_FINE_LOCATION]);
    s.host.grant(manifest::ACCESS_FINE_LOCATION);

    let (outcome, request) = negotiate_with_prompt(&s, &[(manifest::CAMERA, true)]).await;

    // Only the denied capability is prompted for
    assert_eq!(request.capabilities, vec![manifest::CAMERA.to_string()]);
    assert_eq!(outcome, NegotiationOutcome::Granted);
    assert_eq!(s.granted_calls.load(Ordering::SeqCst), 1);
    assert!(s.host.dialogs().is_empty());
}

// ============================================================================
// Version Filter
// ============================================================================

#[tokio::test]
async fn test_version_boundary_excluded_below_minimum() {
    let s = screen(api_level::TIRAMISU - 1, &[manifest::CAMERA, manifest::READ_MEDIA_AUDIO]);

    let (_, request) = negotiate_with_prompt(&s, &[(manifest::CAMERA, true)]).await;
    assert_eq!(request.capabilities, vec![manifest::CAMERA.to_string()]);
}

#[tokio::test]
async fn test_version_boundary_included_at_minimum() {
    let s = screen(api_level::TIRAMISU, &[manifest::CAMERA, manifest::READ_MEDIA_AUDIO]);

    let (_, request) = negotiate_with_prompt(
        &s,
        &[(manifest::CAMERA, true), (manifest::READ_MEDIA_AUDIO, true)],
    )
    .await;
    assert_eq!(
        request.capabilities,
        vec![
            manifest::CAMERA.to_string(),
            manifest::READ_MEDIA_AUDIO.to_string()
        ]
    );
}

#[tokio::test]
async fn test_custom_table_gates_vendor_capability() {
    let host = Arc::new(RecordingHost::new(34));
    let table = CapabilityTable::android().with_capability("com.vendor.LIDAR", "Lidar", Some(35));
    let negotiator = Negotiator::builder()
        .capability("com.vendor.LIDAR")
        .callback(|| {})
        .package_id("com.morg.permission")
        .table(table)
        .host(host.clone())
        .build()
        .unwrap();

    assert!(negotiator.ensure_granted().await.unwrap().is_granted());
    assert!(host.requests().is_empty());
}

// ============================================================================
// Rationale Dialog
// ============================================================================

#[tokio::test]
async fn test_rationale_lists_all_denied_when_any_needs_it() {
    let s = screen(34, &[manifest::CAMERA, manifest::RECORD_AUDIO]);
    s.host.require_rationale(manifest::CAMERA);
    s.host.answer_dialogs([DialogChoice::Positive]);

    let (outcome, request) = negotiate_with_prompt(
        &s,
        &[(manifest::CAMERA, true), (manifest::RECORD_AUDIO, true)],
    )
    .await;

    assert!(outcome.is_granted());
    let dialogs = s.host.dialogs();
    assert_eq!(dialogs.len(), 1);

    let rationale = &dialogs[0];
    assert_eq!(rationale.kind, DialogKind::Rationale);
    assert!(!rationale.cancelable);
    assert_eq!(
        rationale.message,
        "This app requires the following permissions:\n\nCamera\nMicrophone"
    );
    assert_eq!(
        request.capabilities,
        vec![
            manifest::CAMERA.to_string(),
            manifest::RECORD_AUDIO.to_string()
        ]
    );
}

#[tokio::test]
async fn test_rationale_never_lists_granted_capabilities() {
    let s = screen(34, &[manifest::CAMERA, manifest::RECORD_AUDIO, manifest::READ_CONTACTS]);
    s.host.grant(manifest::RECORD_AUDIO);
    s.host.require_rationale(manifest::READ_CONTACTS);
    s.host
        .answer_dialogs([DialogChoice::Negative, DialogChoice::Negative]);

    s.negotiator.ensure_granted().await.unwrap();

    let rationale = &s.host.dialogs()[0];
    let labels: Vec<&str> = rationale
        .capabilities
        .iter()
        .map(|c| c.label.as_str())
        .collect();
    assert_eq!(labels, vec!["Camera", "Read Contacts"]);
    assert!(!rationale.message.contains("Microphone"));
}

#[tokio::test]
async fn test_rationale_uses_configured_strings() {
    let config = NegotiationConfig::builder()
        .title("Notification Access")
        .message("This app requires notification access to function properly.")
        .positive_button("Allow")
        .negative_button("Later")
        .build();
    let s = screen_with_config(34, &[manifest::POST_NOTIFICATIONS], Some(config));
    s.host.require_rationale(manifest::POST_NOTIFICATIONS);

    s.negotiator.ensure_granted().await.unwrap();

    let rationale = &s.host.dialogs()[0];
    assert_eq!(rationale.title, "Notification Access");
    assert_eq!(rationale.positive_button, "Allow");
    assert_eq!(rationale.negative_button, "Later");
    assert_eq!(
        rationale.message,
        "This app requires notification access to function properly.\n\nPost Notifications"
    );
}

#[tokio::test]
async fn test_unknown_capability_label_is_raw_id() {
    let s = screen(34, &["com.vendor.CUSTOM"]);
    s.host.require_rationale("com.vendor.CUSTOM");

    s.negotiator.ensure_granted().await.unwrap();

    let rationale = &s.host.dialogs()[0];
    assert_eq!(rationale.capabilities[0].label, "com.vendor.CUSTOM");
    assert!(rationale.message.ends_with("\n\ncom.vendor.CUSTOM"));
}

#[tokio::test]
async fn test_rationale_negative_skips_os_prompt() {
    let s = screen(34, &[manifest::CAMERA]);
    s.host.require_rationale(manifest::CAMERA);
    s.host.answer_dialogs([DialogChoice::Negative]);

    let outcome = s.negotiator.ensure_granted().await.unwrap();

    assert!(matches!(outcome, NegotiationOutcome::Denied { .. }));
    assert!(s.host.requests().is_empty());
    let kinds: Vec<DialogKind> = s.host.dialogs().iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DialogKind::Rationale, DialogKind::Denied]);
}

// ============================================================================
// Denied Dialog
// ============================================================================

#[tokio::test]
async fn test_partial_grant_shows_denied_dialog() {
    let s = screen(34, &[manifest::CAMERA, manifest::RECORD_AUDIO]);

    let (outcome, _) = negotiate_with_prompt(
        &s,
        &[(manifest::CAMERA, true), (manifest::RECORD_AUDIO, false)],
    )
    .await;

    assert_eq!(
        outcome,
        NegotiationOutcome::Denied {
            denied: vec![manifest::RECORD_AUDIO.to_string()],
            settings_opened: false,
        }
    );
    assert_eq!(s.granted_calls.load(Ordering::SeqCst), 0);

    let dialogs = s.host.dialogs();
    assert_eq!(dialogs.len(), 1);
    assert_eq!(dialogs[0].kind, DialogKind::Denied);
    assert_eq!(dialogs[0].title, "Permission Denied");
    assert_eq!(
        dialogs[0].message,
        "Some permissions are essential. Please enable them in settings."
    );
    assert!(!dialogs[0].cancelable);
}

#[tokio::test]
async fn test_go_to_settings_navigates_once_with_package_id() {
    let s = screen(34, &[manifest::CAMERA]);
    s.host.answer_dialogs([DialogChoice::Positive]);

    let (outcome, _) = negotiate_with_prompt(&s, &[(manifest::CAMERA, false)]).await;

    assert_eq!(
        outcome,
        NegotiationOutcome::Denied {
            denied: vec![manifest::CAMERA.to_string()],
            settings_opened: true,
        }
    );
    assert_eq!(
        s.host.settings_opened(),
        vec!["com.morg.permission".to_string()]
    );
    assert_eq!(s.granted_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_new_call_reevaluates_from_scratch() {
    let s = screen(34, &[manifest::CAMERA]);
    s.host.answer_dialogs([DialogChoice::Positive]);

    let (outcome, _) = negotiate_with_prompt(&s, &[(manifest::CAMERA, false)]).await;
    assert!(!outcome.is_granted());
    assert_eq!(s.negotiator.state(), NegotiationState::Denied);

    // User flips the switch in settings and comes back
    s.host.grant(manifest::CAMERA);
    assert!(s.negotiator.ensure_granted().await.unwrap().is_granted());
    assert_eq!(s.granted_calls.load(Ordering::SeqCst), 1);
    assert_eq!(s.host.requests().len(), 1);
}

// ============================================================================
// Lifecycle & Errors
// ============================================================================

#[tokio::test]
async fn test_stale_request_id_is_ignored() {
    let s = screen(34, &[manifest::CAMERA]);
    assert!(
        !s.negotiator
            .on_permission_result("not-a-request", results(&[(manifest::CAMERA, true)]))
            .await
    );
}

#[tokio::test]
async fn test_destroyed_screen_cancels_and_rebind_recovers() {
    let s = screen(34, &[manifest::CAMERA]);
    let negotiator = s.negotiator.clone();
    let task = tokio::spawn(async move { negotiator.ensure_granted().await });

    s.host.next_request().await.unwrap();
    s.negotiator.on_screen_destroyed().await;

    assert_eq!(task.await.unwrap().unwrap(), NegotiationOutcome::Cancelled);
    assert_eq!(s.granted_calls.load(Ordering::SeqCst), 0);
    assert!(s.host.dialogs().is_empty());

    let recreated = Arc::new(RecordingHost::new(34));
    recreated.grant(manifest::CAMERA);
    s.negotiator
        .rebind(HostBindings::from_host(recreated.clone()));

    assert!(s.negotiator.ensure_granted().await.unwrap().is_granted());
    assert_eq!(s.granted_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rationale_query_failure_surfaces() {
    let s = screen(34, &[manifest::CAMERA]);
    // The grant-status query fails before any rationale check
    s.host.fail_queries_for(manifest::CAMERA);

    let err = s.negotiator.ensure_granted().await.unwrap_err();
    match err {
        PermissionError::HostQuery { capability, .. } => {
            assert_eq!(capability, manifest::CAMERA)
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(s.host.dialogs().is_empty());
}
