//! # climahub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** for operators (`/api/state`, `/api/mode`,
//!   `/api/areas`, `/api/zones`, …)
//! - Stream controller events over **Server-Sent Events**
//!   (`/api/events/stream`)
//! - Map HTTP requests into controller commands (driving adapter) and apply
//!   the operator guards that keep Suspend sticky
//! - Map controller results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `climahub-app` (for the controller and port traits) and
//! `climahub-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
