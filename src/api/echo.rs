//! `echo` module: returns the JSON body it receives.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::{IntoResponse, Response}, Json};
use serde_json::json;

use crate::api::{read_json, RouteSpec};
use crate::loader::{ConstructError, ModuleOptions};
use crate::observability::RouteLogger;
use crate::route::{HandlerError, Middleware, RouteContext, RouteUnit, Verb};

pub struct Echo {
    spec: RouteSpec,
    logger: RouteLogger,
}

impl Echo {
    pub fn construct(options: &ModuleOptions) -> Result<Box<dyn RouteUnit>, ConstructError> {
        Ok(Box::new(Self {
            spec: RouteSpec::from_options(options, "echo", "/echo")?,
            logger: RouteLogger::root(),
        }))
    }
}

#[async_trait]
impl RouteUnit for Echo {
    fn id(&self) -> &str {
        &self.spec.id
    }

    fn method(&self) -> Verb {
        Verb::Post
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
        self.logger = ctx.logger.clone();
        Ok(())
    }

    async fn exec(&self, req: Request<Body>) -> Result<Response, HandlerError> {
        let body = match read_json(req.into_body()).await {
            Ok(body) => body,
            Err(e) => return e.into_outcome(),
        };
        self.logger.debug("Echoing request body");
        Ok(Json(json!({ "echo": body })).into_response())
    }
}
