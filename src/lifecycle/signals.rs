//! OS signal handling and the process-wide panic hook.

use tokio::task::JoinHandle;

use crate::dispatch::adapter::{is_catching, panic_message};
use crate::lifecycle::Shutdown;
use crate::observability::logging::{events, topics};

/// Resolve on Ctrl+C, or SIGTERM on unix.
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Trigger `shutdown` on the first termination signal.
pub fn spawn_signal_handler(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!(topic = topics::PROCESS, event = events::SHUTDOWN, "Shutdown signal received");
        shutdown.trigger();
    })
}

/// Log panics through tracing instead of only stderr.
///
/// The process is not terminated; request panics are already answered by
/// the dispatcher adapter.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        if is_catching() {
            tracing::debug!(
                topic = topics::PROCESS,
                "Panic caught and reported by caller: {}",
                panic_message(info.payload())
            );
            return;
        }
        let location = info
            .location()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        tracing::error!(
            topic = topics::PROCESS,
            event = events::ERROR,
            location = %location,
            "Panic: {}",
            panic_message(info.payload())
        );
    }));
}
