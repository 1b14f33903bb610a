//! Built-in per-route middlewares.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderName, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::route::{HandlerError, Middleware, Next};

/// Rejects requests whose content type is not JSON with 415.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireJson;

#[async_trait]
impl Middleware for RequireJson {
    fn name(&self) -> &str {
        "require_json"
    }

    async fn handle(&self, req: Request<Body>, next: Next<'_>) -> Result<Response, HandlerError> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or("").trim().eq_ignore_ascii_case("application/json"))
            .unwrap_or(false);

        if !is_json {
            return Ok((
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                Json(json!({ "error": "Expected content-type application/json" })),
            )
                .into_response());
        }
        next.run(req).await
    }
}

/// Rejects requests missing a header with 400.
#[derive(Debug, Clone)]
pub struct RequireHeader {
    header: HeaderName,
}

impl RequireHeader {
    pub fn new(name: &str) -> Result<Self, axum::http::header::InvalidHeaderName> {
        Ok(Self {
            header: HeaderName::from_bytes(name.as_bytes())?,
        })
    }
}

#[async_trait]
impl Middleware for RequireHeader {
    fn name(&self) -> &str {
        "require_header"
    }

    async fn handle(&self, req: Request<Body>, next: Next<'_>) -> Result<Response, HandlerError> {
        if !req.headers().contains_key(&self.header) {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Missing {} header", self.header.as_str()) })),
            )
                .into_response());
        }
        next.run(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{RouteUnit, Verb};
    use std::sync::Arc;

    struct Ok200;

    #[async_trait]
    impl RouteUnit for Ok200 {
        fn id(&self) -> &str {
            "ok"
        }

        fn method(&self) -> Verb {
            Verb::Post
        }

        fn endpoint(&self) -> &str {
            "/"
        }

        async fn exec(&self, _req: Request<Body>) -> Result<Response, HandlerError> {
            Ok(StatusCode::OK.into_response())
        }
    }

    async fn run(middleware: Arc<dyn Middleware>, req: Request<Body>) -> StatusCode {
        let chain = [middleware];
        Next::new(&chain, &Ok200).run(req).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_require_json() {
        let req = Request::builder()
            .header("content-type", "application/json; charset=utf-8")
            .body(Body::empty())
            .unwrap();
        assert_eq!(run(Arc::new(RequireJson), req).await, StatusCode::OK);

        let req = Request::builder()
            .header("content-type", "text/plain")
            .body(Body::empty())
            .unwrap();
        assert_eq!(run(Arc::new(RequireJson), req).await, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_require_header() {
        let middleware: Arc<dyn Middleware> = Arc::new(RequireHeader::new("x-tenant").unwrap());

        let req = Request::builder().header("X-Tenant", "acme").body(Body::empty()).unwrap();
        assert_eq!(run(middleware.clone(), req).await, StatusCode::OK);

        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(run(middleware, req).await, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_header_name() {
        assert!(RequireHeader::new("bad header").is_err());
    }
}
