//! # climahub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ConfigStore`: load and save the configuration snapshot
//!   - `ActuatorDriver`: read and command thermostats, numeric setpoints, switches
//!   - `SensorReader`: read room temperatures
//!   - `EventPublisher`: notify listeners after state changes
//! - Provide the **controller** (driving port): operator commands, the control
//!   pass, immediate-apply, and the configuration operations
//! - Provide the **scheduler** that ticks the control pass periodically
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `climahub-domain` only (plus `tokio` for channels, locks and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod controller;
pub mod dispatch;
pub mod event_bus;
pub mod ports;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;
