//! Uniform request adapter.
//!
//! # Responsibilities
//! - Run a bound unit's middleware chain and `exec`
//! - Catch every failure, including panics, and answer with a 500
//! - Record per-route request metrics
//!
//! # Design Decisions
//! - The failure body is always `{"error": <message>}`
//! - Panics are caught around the chain future, so a broken unit cannot leave
//!   a request unanswered

use std::any::Any;
use std::cell::Cell;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures_util::FutureExt;
use serde_json::json;

use crate::observability::logging::topics;
use crate::observability::metrics;
use crate::route::{HandlerError, Middleware, Next, RouteUnit};

/// A registered unit prepared for binding.
#[derive(Clone)]
pub struct RouteAdapter {
    unit: Arc<dyn RouteUnit>,
    middlewares: Arc<[Arc<dyn Middleware>]>,
}

impl RouteAdapter {
    /// Capture the unit's middlewares once, at bind time.
    pub fn new(unit: Arc<dyn RouteUnit>) -> Self {
        let middlewares: Arc<[Arc<dyn Middleware>]> = unit.middlewares().into();
        Self { unit, middlewares }
    }

    pub fn unit(&self) -> &Arc<dyn RouteUnit> {
        &self.unit
    }

    /// Handle one request. Never fails.
    pub async fn call(self, req: Request<Body>) -> Response {
        let started = Instant::now();
        let route_id = self.unit.id();

        let chain = Next::new(&self.middlewares, self.unit.as_ref()).run(req);
        let outcome = match AssertUnwindSafe(chain).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(HandlerError::Panic(panic_message(payload.as_ref()))),
        };

        let response = match outcome {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(
                    topic = topics::HANDLER,
                    route_id = %route_id,
                    error = %error,
                    "Route handler failed"
                );
                metrics::record_handler_failure(route_id);
                failure_response(&error)
            }
        };

        metrics::record_request(route_id, response.status().as_u16(), started);
        response
    }
}

/// The response sent for any caught failure.
pub fn failure_response(error: &HandlerError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": error.client_message() })),
    )
        .into_response()
}

thread_local! {
    static CATCHING: Cell<bool> = const { Cell::new(false) };
}

/// Run `f`, catching any panic it raises.
///
/// Panics raised inside are reported by the caller, so the process panic
/// hook only logs them at debug level (see [`is_catching`]).
pub(crate) fn catch_reported<R>(f: impl FnOnce() -> R) -> std::thread::Result<R> {
    let previous = CATCHING.with(|c| c.replace(true));
    let result = std::panic::catch_unwind(AssertUnwindSafe(f));
    CATCHING.with(|c| c.set(previous));
    result
}

/// Whether the current thread is inside [`catch_reported`].
pub(crate) fn is_catching() -> bool {
    CATCHING.with(Cell::get)
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::error::GENERIC_FAILURE_MESSAGE;
    use crate::route::Verb;
    use async_trait::async_trait;

    enum Mode {
        Ok,
        Fail(&'static str),
        Silent,
        Panic,
    }

    struct Unit(Mode);

    #[async_trait]
    impl RouteUnit for Unit {
        fn id(&self) -> &str {
            "unit"
        }

        fn method(&self) -> Verb {
            Verb::Get
        }

        fn endpoint(&self) -> &str {
            "/unit"
        }

        async fn exec(&self, _req: Request<Body>) -> Result<Response, HandlerError> {
            match self.0 {
                Mode::Ok => Ok((StatusCode::CREATED, "made").into_response()),
                Mode::Fail(msg) => Err(HandlerError::new(msg)),
                Mode::Silent => Err(HandlerError::Unspecified),
                Mode::Panic => panic!("exec exploded"),
            }
        }
    }

    async fn call(mode: Mode) -> (StatusCode, serde_json::Value) {
        let adapter = RouteAdapter::new(Arc::new(Unit(mode)));
        let response = adapter.call(Request::new(Body::empty())).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let (status, _) = call(Mode::Ok).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_failure_message_reported() {
        let (status, body) = call(Mode::Fail("boom")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "boom"}));
    }

    #[tokio::test]
    async fn test_failure_without_message_uses_generic() {
        let (status, body) = call(Mode::Silent).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": GENERIC_FAILURE_MESSAGE}));
    }

    #[tokio::test]
    async fn test_panic_is_caught() {
        let (status, body) = call(Mode::Panic).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "exec exploded"}));
    }

    #[test]
    fn test_panic_message_extraction() {
        let boxed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(boxed.as_ref()), "static");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "");
    }

    #[test]
    fn test_catch_reported_marks_only_its_scope() {
        assert!(!is_catching());
        assert!(catch_reported(is_catching).unwrap());

        let result = catch_reported::<()>(|| panic!("rejected"));
        assert_eq!(panic_message(result.unwrap_err().as_ref()), "rejected");
        assert!(!is_catching());
    }
}
