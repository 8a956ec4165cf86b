//! Event bus port: publish/subscribe for controller events.

use std::future::Future;

use climahub_domain::error::ClimaError;
use climahub_domain::event::Event;

/// Publishes controller events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), ClimaError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), ClimaError>> + Send {
        (**self).publish(event)
    }
}
