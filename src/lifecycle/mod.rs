//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Connect persistence → Loader → Registry → Dispatcher → base layers
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → listeners drain → snapshot flushed
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     panic anywhere → logged, process keeps running
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Phases run strictly in order; listeners start last

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{bootstrap, Engine, StartupError};
