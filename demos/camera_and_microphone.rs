//! Camera and microphone: rationale, partial grant, then the settings fallback.
//!
//! The user denied the camera once before, so the negotiation opens with a
//! rationale dialog listing both capabilities. The user then allows the camera
//! but refuses the microphone, and the denied dialog sends them to settings.
//!
//! ## Run
//! ```sh
//! cargo run -p demos --example camera_and_microphone
//! ```

mod simulated_device;

use permission_access::capability::{api_level, manifest};
use permission_access::prelude::*;
use simulated_device::SimulatedDevice;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "permission_access=debug".parse().unwrap()),
        )
        .init();

    let (device, prompts) = SimulatedDevice::new(api_level::S);
    device.previously_denied(manifest::CAMERA);
    device.user_taps([DialogChoice::Positive, DialogChoice::Positive]);
    device.user_answers(manifest::CAMERA, true);
    device.user_answers(manifest::RECORD_AUDIO, false);

    let negotiator = Arc::new(
        Negotiator::builder()
            // READ_MEDIA_VIDEO needs API 33 and is dropped on this device
            .capabilities([
                manifest::CAMERA,
                manifest::RECORD_AUDIO,
                manifest::READ_MEDIA_VIDEO,
            ])
            .callback(|| println!("  [Screen] Starting video call"))
            .package_id("com.example.videocall")
            .host(device.clone())
            .build()?,
    );
    let os = device.run_os(prompts, negotiator.clone());

    match negotiator.ensure_granted().await? {
        NegotiationOutcome::Granted => println!("All set"),
        NegotiationOutcome::Denied {
            denied,
            settings_opened,
        } => println!(
            "Still missing {:?} (sent to settings: {})",
            denied, settings_opened
        ),
        NegotiationOutcome::Cancelled => println!("Screen went away"),
    }

    negotiator.on_screen_destroyed().await;
    os.abort();
    Ok(())
}
