//! Shared application state for axum handlers.

use std::sync::Arc;

use climahub_app::controller::Controller;
use climahub_app::event_bus::InProcessEventBus;

/// Application state shared across all axum handlers.
///
/// Generic over the controller's port types to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<S, A, R, P> {
    /// The thermostat controller.
    pub controller: Arc<Controller<S, A, R, P>>,
    /// Event bus for real-time SSE streaming.
    pub event_bus: Arc<InProcessEventBus>,
}

impl<S, A, R, P> Clone for AppState<S, A, R, P> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            event_bus: Arc::clone(&self.event_bus),
        }
    }
}

impl<S, A, R, P> AppState<S, A, R, P> {
    /// Create a new application state.
    ///
    /// The controller is shared with the control loop, hence the `Arc`.
    pub fn new(controller: Arc<Controller<S, A, R, P>>, event_bus: Arc<InProcessEventBus>) -> Self {
        Self {
            controller,
            event_bus,
        }
    }
}
