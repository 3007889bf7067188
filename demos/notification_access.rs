//! Notification access: the smallest complete negotiation.
//!
//! A screen asks for POST_NOTIFICATIONS with its own dialog strings and shows a
//! "toast" when access is granted. The second button press finds the
//! permission already granted and skips every dialog.
//!
//! ## Run
//! ```sh
//! cargo run -p demos --example notification_access
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

    let (device, prompts) = SimulatedDevice::new(api_level::UPSIDE_DOWN_CAKE);
    device.user_answers(manifest::POST_NOTIFICATIONS, true);

    let config = NegotiationConfig::builder()
        .title("Notification Access")
        .message("This app requires notification access to function properly.")
        .positive_button("Grant")
        .negative_button("Cancel")
        .denied_title("Notification Access Denied")
        .denied_message("Notification access is essential. Please enable it in settings.")
        .denied_positive_button("Go to Settings")
        .denied_negative_button("Cancel")
        .build();

    let negotiator = Arc::new(
        Negotiator::builder()
            .capabilities([manifest::POST_NOTIFICATIONS])
            .callback(|| println!("  [Toast] Notification access granted"))
            .config(config)
            .package_id("com.morg.permission")
            .host(device.clone())
            .build()?,
    );
    let os = device.run_os(prompts, negotiator.clone());

    for press in 1..=2 {
        println!("Button press #{}", press);
        let outcome = negotiator.ensure_granted().await?;
        println!("  -> {:?}\n", outcome);
    }

    negotiator.on_screen_destroyed().await;
    os.abort();
    Ok(())
}
