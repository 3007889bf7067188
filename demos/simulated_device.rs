//! A console "device" that plays the host platform for the demos.
//!
//! Dialogs are printed and answered from a script of user taps. The OS
//! permission prompt runs on a separate task, the way a real platform delivers
//! its result through an activity callback.

#![allow(dead_code)]

use async_trait::async_trait;
use permission_access::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct SimulatedDevice {
    api_level: u32,
    granted: Mutex<HashSet<String>>,
    rationale: Mutex<HashSet<String>>,
    taps: Mutex<VecDeque<DialogChoice>>,
    prompt_answers: Mutex<HashMap<String, bool>>,
    prompts: mpsc::UnboundedSender<PermissionRequest>,
}

impl SimulatedDevice {
    pub fn new(api_level: u32) -> (Arc<Self>, mpsc::UnboundedReceiver<PermissionRequest>) {
        let (prompts, rx) = mpsc::unbounded_channel();
        let device = Arc::new(Self {
            api_level,
            granted: Mutex::new(HashSet::new()),
            rationale: Mutex::new(HashSet::new()),
            taps: Mutex::new(VecDeque::new()),
            prompt_answers: Mutex::new(HashMap::new()),
            prompts,
        });
        (device, rx)
    }

    /// The user denied this capability before, without "don't ask again"
    pub fn previously_denied(&self, capability: &str) {
        self.rationale.lock().unwrap().insert(capability.to_string());
    }

    /// What the user will tap in the next dialogs
    pub fn user_taps(&self, taps: impl IntoIterator<Item = DialogChoice>) {
        self.taps.lock().unwrap().extend(taps);
    }

    /// What the user will answer in the OS prompt
    pub fn user_answers(&self, capability: &str, allow: bool) {
        self.prompt_answers
            .lock()
            .unwrap()
            .insert(capability.to_string(), allow);
    }

    /// Play the OS: answer every prompt and route the result to the negotiator
    pub fn run_os(
        self: &Arc<Self>,
        mut prompts: mpsc::UnboundedReceiver<PermissionRequest>,
        negotiator: Arc<Negotiator>,
    ) -> JoinHandle<()> {
        let device = self.clone();
        tokio::spawn(async move {
            while let Some(request) = prompts.recv().await {
                let results: PromptResults = request
                    .capabilities
                    .iter()
                    .map(|id| {
                        let allow = device
                            .prompt_answers
                            .lock()
                            .unwrap()
                            .get(id)
                            .copied()
                            .unwrap_or(false);
                        println!("  [OS] {} -> {}", id, if allow { "Allow" } else { "Don't allow" });
                        if allow {
                            device.granted.lock().unwrap().insert(id.clone());
                        }
                        (id.clone(), allow)
                    })
                    .collect();
                negotiator.on_permission_result(&request.id, results).await;
            }
        })
    }
}

impl PermissionOracle for SimulatedDevice {
    fn platform_version(&self) -> u32 {
        self.api_level
    }

    fn is_granted(&self, capability: &str) -> Result<bool, PermissionError> {
        Ok(self.granted.lock().unwrap().contains(capability))
    }

    fn should_show_rationale(&self, capability: &str) -> Result<bool, PermissionError> {
        Ok(self.rationale.lock().unwrap().contains(capability))
    }
}

impl PermissionLauncher for SimulatedDevice {
    fn launch(&self, request: &PermissionRequest) -> Result<(), PermissionError> {
        println!("  [OS] Permission prompt for {:?}", request.capabilities);
        self.prompts
            .send(request.clone())
            .map_err(|e| PermissionError::Launch(e.to_string()))
    }
}

#[async_trait]
impl DialogPresenter for SimulatedDevice {
    async fn show(&self, dialog: Dialog) -> Result<DialogChoice, PermissionError> {
        println!("  ┌─ {}", dialog.title);
        for line in dialog.message.lines() {
            println!("  │ {}", line);
        }
        println!("  └─ [{}]  [{}]", dialog.negative_button, dialog.positive_button);

        let choice = self
            .taps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(DialogChoice::Negative);
        let label = match choice {
            DialogChoice::Positive => &dialog.positive_button,
            DialogChoice::Negative => &dialog.negative_button,
        };
        println!("  [User] taps \"{}\"", label);
        Ok(choice)
    }
}

impl SettingsNavigator for SimulatedDevice {
    fn open_app_settings(&self, package_id: &str) -> Result<(), PermissionError> {
        println!("  [OS] Opening app settings for package:{}", package_id);
        Ok(())
    }
}
