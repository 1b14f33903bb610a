//! `health` module: liveness probe.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::{IntoResponse, Response}, Json};
use serde_json::json;

use crate::api::RouteSpec;
use crate::loader::{ConstructError, ModuleOptions};
use crate::persistence::Persistence;
use crate::route::{HandlerError, Middleware, RouteContext, RouteUnit, Verb};

pub struct Health {
    spec: RouteSpec,
    started: Option<Instant>,
    persistence: Option<Arc<dyn Persistence>>,
}

impl Health {
    pub fn construct(options: &ModuleOptions) -> Result<Box<dyn RouteUnit>, ConstructError> {
        Ok(Box::new(Self {
            spec: RouteSpec::from_options(options, "health", "/health")?,
            started: None,
            persistence: None,
        }))
    }
}

#[async_trait]
impl RouteUnit for Health {
    fn id(&self) -> &str {
        &self.spec.id
    }

    fn method(&self) -> Verb {
        Verb::Get
    }

    fn endpoint(&self) -> &str {
        &self.spec.endpoint
    }

    fn order(&self) -> i32 {
        self.spec.order
    }

    fn middlewares(&self) -> Vec<Arc<dyn Middleware>> {
        self.spec.middlewares.clone()
    }

    async fn init(&mut self, ctx: &RouteContext) -> Result<(), HandlerError> {
        self.started = Some(Instant::now());
        self.persistence = Some(ctx.persistence.clone());
        Ok(())
    }

    async fn exec(&self, _req: Request<Body>) -> Result<Response, HandlerError> {
        let uptime_secs = self.started.map(|s| s.elapsed().as_secs()).unwrap_or(0);
        let persistence = self.persistence.as_ref().map(|p| p.name()).unwrap_or("none");
        Ok(Json(json!({
            "status": "ok",
            "uptime_secs": uptime_secs,
            "persistence": persistence,
        }))
        .into_response())
    }
}
