//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Registry (registration order)
//!     → dispatcher.rs (stable sort by order, attach to axum::Router)
//!     → adapter.rs (per request: middlewares → exec → catch failures)
//!     → Response (unit's own, or 500 {"error": ...})
//! ```
//!
//! # Design Decisions
//! - `order` controls binding order only, never per-request scheduling
//! - Request-phase failures never escape the adapter

pub mod adapter;
pub mod dispatcher;

pub use adapter::{failure_response, RouteAdapter};
pub use dispatcher::{bind_order, BindError, BoundRoute, Dispatcher};
