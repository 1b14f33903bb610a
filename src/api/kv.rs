//! `kv.get`, `kv.put`, `kv.delete` modules: key/value access through the
//! shared persistence handle.
//!
//! The endpoint template must contain a `:key` segment.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{FromRequestParts, Path},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::api::{read_json, RouteSpec};
use crate::loader::{ConstructError, ModuleOptions};
use crate::observability::RouteLogger;
use crate::persistence::Persistence;
use crate::route::{HandlerError, Middleware, RouteContext, RouteUnit, Verb};

const DEFAULT_ENDPOINT: &str = "/kv/:key";

/// State shared by the three key/value units.
struct KvBase {
    spec: RouteSpec,
    store: Option<Arc<dyn Persistence>>,
    logger: RouteLogger,
}

impl KvBase {
    fn from_options(options: &ModuleOptions, default_id: &str) -> Result<Self, ConstructError> {
        let spec = RouteSpec::from_options(options, default_id, DEFAULT_ENDPOINT)?;
        if !spec.endpoint.split('/').any(|segment| segment == ":key") {
            return Err(ConstructError(format!(
                "endpoint `{}` must contain a `:key` segment",
                spec.endpoint
            )));
        }
        Ok(Self {
            spec,
            store: None,
            logger: RouteLogger::root(),
        })
    }

    fn init(&mut self, ctx: &RouteContext) {
        self.store = Some(ctx.persistence.clone());
        self.logger = ctx.logger.clone();
    }

    fn store(&self) -> Result<&Arc<dyn Persistence>, HandlerError> {
        self.store
            .as_ref()
            .ok_or_else(|| HandlerError::new("persistence handle not initialized"))
    }
}

/// Split the request into its `:key` parameter and body.
async fn key_and_body(req: Request<Body>) -> Result<(String, Body), HandlerError> {
    let (mut parts, body) = req.into_parts();
    let Path(params) = Path::<HashMap<String, String>>::from_request_parts(&mut parts, &())
        .await
        .map_err(|e| HandlerError::Body(e.body_text()))?;
    let key = params
        .get("key")
        .cloned()
        .ok_or_else(|| HandlerError::new("missing `key` path parameter"))?;
    Ok((key, body))
}

fn not_found(key: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("Key `{key}` not found") })),
    )
        .into_response()
}

pub struct KvGet(KvBase);

impl KvGet {
    pub fn construct(options: &ModuleOptions) -> Result<Box<dyn RouteUnit>, ConstructError> {
        Ok(Box::new(Self(KvBase::from_options(options, "kv.get")?)))
    }
}

#[async_trait]
impl RouteUnit for KvGet {
    fn id(&self) -> &str {
        &self.0.spec.id
    }

    fn method(&self) -> Verb {
        Verb::Get
    }

    fn endpoint(&self) -> &str {
        &self.0.spec.endpoint
    }

    fn order(&self) -> i32 {
        self.0.spec.order
    }

    fn middlewares(&self) -> Vec<Arc<dyn Middleware>> {
        self.0.spec.middlewares.clone()
    }

    async fn init(&mut self, ctx: &RouteContext) -> Result<(), HandlerError> {
        self.0.init(ctx);
        Ok(())
    }

    async fn exec(&self, req: Request<Body>) -> Result<Response, HandlerError> {
        let (key, _) = key_and_body(req).await?;
        match self.0.store()?.get(&key).await? {
            Some(value) => Ok(Json(json!({ "key": key, "value": value })).into_response()),
            None => Ok(not_found(&key)),
        }
    }
}

pub struct KvPut(KvBase);

impl KvPut {
    pub fn construct(options: &ModuleOptions) -> Result<Box<dyn RouteUnit>, ConstructError> {
        Ok(Box::new(Self(KvBase::from_options(options, "kv.put")?)))
    }
}

#[async_trait]
impl RouteUnit for KvPut {
    fn id(&self) -> &str {
        &self.0.spec.id
    }

    fn method(&self) -> Verb {
        Verb::Put
    }

    fn endpoint(&self) -> &str {
        &self.0.spec.endpoint
    }

    fn order(&self) -> i32 {
        self.0.spec.order
    }

    fn middlewares(&self) -> Vec<Arc<dyn Middleware>> {
        self.0.spec.middlewares.clone()
    }

    async fn init(&mut self, ctx: &RouteContext) -> Result<(), HandlerError> {
        self.0.init(ctx);
        Ok(())
    }

    async fn exec(&self, req: Request<Body>) -> Result<Response, HandlerError> {
        let (key, body) = key_and_body(req).await?;
        let value = match read_json(body).await {
            Ok(value) => value,
            Err(e) => return e.into_outcome(),
        };
        let previous = self.0.store()?.put(&key, value.clone()).await?;

        let status = if previous.is_some() {
            StatusCode::OK
        } else {
            self.0.logger.debug(&format!("Created key {key}"));
            StatusCode::CREATED
        };
        Ok((status, Json(json!({ "key": key, "value": value }))).into_response())
    }
}

pub struct KvDelete(KvBase);

impl KvDelete {
    pub fn construct(options: &ModuleOptions) -> Result<Box<dyn RouteUnit>, ConstructError> {
        Ok(Box::new(Self(KvBase::from_options(options, "kv.delete")?)))
    }
}

#[async_trait]
impl RouteUnit for KvDelete {
    fn id(&self) -> &str {
        &self.0.spec.id
    }

    fn method(&self) -> Verb {
        Verb::Delete
    }

    fn endpoint(&self) -> &str {
        &self.0.spec.endpoint
    }

    fn order(&self) -> i32 {
        self.0.spec.order
    }

    fn middlewares(&self) -> Vec<Arc<dyn Middleware>> {
        self.0.spec.middlewares.clone()
    }

    async fn init(&mut self, ctx: &RouteContext) -> Result<(), HandlerError> {
        self.0.init(ctx);
        Ok(())
    }

    async fn exec(&self, req: Request<Body>) -> Result<Response, HandlerError> {
        let (key, _) = key_and_body(req).await?;
        if self.0.store()?.delete(&key).await? {
            Ok(StatusCode::NO_CONTENT.into_response())
        } else {
            Ok(not_found(&key))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_must_have_key_segment() {
        let table: toml::Table = toml::from_str("endpoint = \"/kv/:id\"").unwrap();
        assert!(KvGet::construct(&ModuleOptions::new(table)).is_err());

        let table: toml::Table = toml::from_str("endpoint = \"/store/:key\"").unwrap();
        let unit = KvPut::construct(&ModuleOptions::new(table)).unwrap();
        assert_eq!(unit.endpoint(), "/store/:key");
        assert_eq!(unit.id(), "kv.put");
    }

    #[tokio::test]
    async fn test_exec_before_init_fails() {
        let unit = KvDelete::construct(&ModuleOptions::default()).unwrap();
        assert!(unit.exec(Request::new(Body::empty())).await.is_err());
    }
}
