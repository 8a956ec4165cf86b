//! # climahub-domain
//!
//! Pure domain model for the climahub whole-building thermostat.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Areas** (a room with one temperature sensor and one actuator)
//! - Define **Actuators** (thermostat, numeric setpoint, on/off switch)
//! - Define **Zones** (groups of areas eligible for a warm boost)
//! - Define the **global state** (mode, house target, active zone, suspend)
//! - Implement the **banded setpoint** math and switch hysteresis
//! - Hold the per-area **runtime** bookkeeping used for rate limiting
//! - Define **Events** emitted to listeners after state mutations
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod actuator;
pub mod area;
pub mod event;
pub mod hvac;
pub mod hysteresis;
pub mod options;
pub mod runtime;
pub mod setpoint;
pub mod snapshot;
pub mod zone;
