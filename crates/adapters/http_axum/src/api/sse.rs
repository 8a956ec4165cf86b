//! Server-Sent Events (SSE) stream for real-time updates.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use climahub_app::ports::{ActuatorDriver, ConfigStore, EventPublisher, SensorReader};
use climahub_domain::event::Event as DomainEvent;

use crate::state::AppState;

/// Encode a controller event as an SSE frame named after its payload kind.
fn to_sse(event: &DomainEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Event::default().event(event.payload.kind()).data(json)),
        Err(err) => {
            tracing::warn!(%err, "failed to serialize event to JSON for SSE stream");
            None
        }
    }
}

/// `GET /api/events/stream`: SSE stream of controller events.
///
/// Subscribes to the event bus broadcast channel and sends JSON-encoded
/// events as SSE `data:` frames. The stream continues until the client
/// disconnects or the event bus is closed.
pub async fn stream<S, A, R, P>(
    State(state): State<AppState<S, A, R, P>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    S: ConfigStore + Send + Sync + 'static,
    A: ActuatorDriver + Send + Sync + 'static,
    R: SensorReader + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let event_rx = state.event_bus.subscribe();
    let event_stream = BroadcastStream::new(event_rx).filter_map(|result| match result {
        Ok(event) => to_sse(&event).map(Ok::<_, std::convert::Infallible>),
        Err(BroadcastStreamRecvError::Lagged(n)) => {
            tracing::warn!(
                skipped = n,
                "SSE subscriber lagged, some events were dropped"
            );
            None
        }
    });

    Sse::new(event_stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture;
    use climahub_domain::event::EventPayload;
    use climahub_domain::hvac::HvacMode;

    #[tokio::test]
    async fn should_subscribe_to_event_bus_when_stream_created() {
        let f = fixture();
        let event_bus = std::sync::Arc::clone(&f.state.event_bus);
        let before = event_bus.subscriber_count();

        let _sse_response = stream(State(f.state)).await;

        assert_eq!(event_bus.subscriber_count(), before + 1);
    }

    #[tokio::test]
    async fn should_forward_controller_events_to_subscribers() {
        let f = fixture();
        let mut rx = f.state.event_bus.subscribe();

        f.state
            .controller
            .set_hvac_mode(HvacMode::Heat)
            .await
            .unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(
            received.payload,
            EventPayload::ModeChanged {
                mode: HvacMode::Heat
            }
        );
    }

    #[test]
    fn should_encode_event_as_sse_frame() {
        let event = DomainEvent::new(EventPayload::TargetChanged { target: 21.5 });

        assert!(to_sse(&event).is_some());
    }
}
