//! Success callback trait.

/// Callback invoked when every requested capability is granted
///
/// This trait can be implemented directly or used with closures via the blanket implementation.
/// It fires at most once per negotiation and never for denied or cancelled negotiations; those
/// are reported through [`NegotiationOutcome`](crate::negotiation::NegotiationOutcome).
///
/// # Examples
///
/// ## Using a closure
///
/// ```
/// use permission_access::callback::PermissionCallback;
///
/// let callback = || println!("Notification access granted");
/// callback.on_permission_granted();
/// ```
///
/// ## Implementing directly
///
/// ```
/// use permission_access::callback::PermissionCallback;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// #[derive(Default)]
/// struct CameraScreen {
///     preview_started: AtomicBool,
/// }
///
/// impl PermissionCallback for CameraScreen {
///     fn on_permission_granted(&self) {
///         self.preview_started.store(true, Ordering::SeqCst);
///     }
/// }
/// ```
pub trait PermissionCallback: Send + Sync {
    /// All requested (and supported) capabilities are granted
    fn on_permission_granted(&self);
}

impl<F> PermissionCallback for F
where
    F: Fn() + Send + Sync,
{
    fn on_permission_granted(&self) {
        self()
    }
}
