//! Event: an immutable record of a controller state change.
//!
//! Events are published after every operator command and after each pass
//! recomputes the aggregate temperature, so presentation layers can refresh.

use serde::{Deserialize, Serialize};

use crate::hvac::{ActiveZone, HvacMode};
use crate::id::{AreaId, EventId};
use crate::time::{Timestamp, now};

/// Something that changed in the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    ModeChanged { mode: HvacMode },
    TargetChanged { target: f64 },
    ActiveZoneChanged { zone: ActiveZone },
    ZoneOffsetChanged { offset: f64 },
    AreaIncludedChanged { area_id: AreaId, included: bool },
    TemperatureChanged { temperature: Option<f64> },
}

impl EventPayload {
    /// Stable short name of the payload variant, used as the SSE event name.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ModeChanged { .. } => "mode_changed",
            Self::TargetChanged { .. } => "target_changed",
            Self::ActiveZoneChanged { .. } => "active_zone_changed",
            Self::ZoneOffsetChanged { .. } => "zone_offset_changed",
            Self::AreaIncludedChanged { .. } => "area_included_changed",
            Self::TemperatureChanged { .. } => "temperature_changed",
        }
    }
}

/// A timestamped [`EventPayload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    #[serde(flatten)]
    pub payload: EventPayload,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: EventId::new(),
            payload,
            timestamp: now(),
        }
    }
}

impl From<EventPayload> for Event {
    fn from(payload: EventPayload) -> Self {
        Self::new(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_distinct_ids() {
        let a = Event::new(EventPayload::TargetChanged { target: 21.0 });
        let b = Event::new(EventPayload::TargetChanged { target: 21.0 });
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn should_flatten_payload_with_type_tag() {
        let event = Event::new(EventPayload::ModeChanged {
            mode: HvacMode::Heat,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "mode_changed");
        assert_eq!(json["mode"], "heat");
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn should_expose_kind_matching_serde_tag() {
        let payload = EventPayload::TemperatureChanged {
            temperature: Some(20.5),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], payload.kind());
    }

    #[test]
    fn should_roundtrip_active_zone_payload() {
        let event: Event = EventPayload::ActiveZoneChanged {
            zone: ActiveZone::Suspend,
        }
        .into();
        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
