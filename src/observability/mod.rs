//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Startup and route code produce:
//!     → logging.rs (structured log events, per-route logger handles)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Every startup event carries `topic` and `event` fields
//! - Route units log through a span scoped to their id
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

pub use logging::{init_tracing, RouteLogger};
