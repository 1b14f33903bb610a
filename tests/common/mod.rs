//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;
use axum::Router;
use route_engine::route::{HandlerError, Middleware, Next, RouteContext, RouteUnit, Verb};
use serde_json::Value;
use tower::ServiceExt;

/// Ordered record of what ran, shared between probes and middlewares.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// What a probe's `exec` does.
#[derive(Clone)]
pub enum Behavior {
    Reply(&'static str),
    Fail(&'static str),
    FailBlank,
    Panic(&'static str),
}

/// Invocation counters readable after the probe is handed to the registry.
#[derive(Clone, Default)]
pub struct Counters {
    pub init: Arc<AtomicUsize>,
    pub exec: Arc<AtomicUsize>,
}

impl Counters {
    pub fn init(&self) -> usize {
        self.init.load(Ordering::SeqCst)
    }

    pub fn exec(&self) -> usize {
        self.exec.load(Ordering::SeqCst)
    }
}

/// A configurable route unit that records everything done to it.
pub struct Probe {
    pub id: String,
    pub method: Verb,
    pub endpoint: String,
    pub order: i32,
    pub behavior: Behavior,
    pub middlewares: Vec<Arc<dyn Middleware>>,
    pub counters: Counters,
    pub log: EventLog,
}

impl Probe {
    pub fn new(id: &str, endpoint: &str) -> Self {
        Self {
            id: id.to_string(),
            method: Verb::Get,
            endpoint: endpoint.to_string(),
            order: 0,
            behavior: Behavior::Reply("ok"),
            middlewares: Vec::new(),
            counters: Counters::default(),
            log: event_log(),
        }
    }

    pub fn with_method(mut self, method: Verb) -> Self {
        self.method = method;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    pub fn counters(&self) -> Counters {
        self.counters.clone()
    }

    pub fn boxed(self) -> Box<dyn RouteUnit> {
        Box::new(self)
    }
}

#[async_trait]
impl RouteUnit for Probe {
    fn id(&self) -> &str {
        &self.id
    }

    fn method(&self) -> Verb {
        self.method
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn middlewares(&self) -> Vec<Arc<dyn Middleware>> {
        self.middlewares.clone()
    }

    async fn init(&mut self, _ctx: &RouteContext) -> Result<(), HandlerError> {
        self.counters.init.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn exec(&self, _req: Request<Body>) -> Result<axum::response::Response, HandlerError> {
        self.counters.exec.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(format!("exec:{}", self.id));
        match &self.behavior {
            Behavior::Reply(text) => Ok(text.into_response()),
            Behavior::Fail(message) => Err(HandlerError::new(*message)),
            Behavior::FailBlank => Err(HandlerError::Unspecified),
            Behavior::Panic(message) => panic!("{}", message),
        }
    }
}

/// Middleware that appends its name to the log and passes the request on.
pub struct Recorder {
    pub name: &'static str,
    pub log: EventLog,
}

impl Recorder {
    pub fn arc(name: &'static str, log: &EventLog) -> Arc<dyn Middleware> {
        Arc::new(Self { name, log: log.clone() })
    }
}

#[async_trait]
impl Middleware for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    async fn handle(&self, req: Request<Body>, next: Next<'_>) -> Result<axum::response::Response, HandlerError> {
        self.log.lock().unwrap().push(format!("mw:{}", self.name));
        next.run(req).await
    }
}

/// Middleware that answers 403 without calling the rest of the chain.
pub struct Deny;

#[async_trait]
impl Middleware for Deny {
    fn name(&self) -> &str {
        "deny"
    }

    async fn handle(&self, _req: Request<Body>, _next: Next<'_>) -> Result<axum::response::Response, HandlerError> {
        Ok(StatusCode::FORBIDDEN.into_response())
    }
}

/// Middleware that fails before the rest of the chain runs.
pub enum Faulty {
    Fail(&'static str),
    Panic(&'static str),
}

#[async_trait]
impl Middleware for Faulty {
    fn name(&self) -> &str {
        "faulty"
    }

    async fn handle(&self, _req: Request<Body>, _next: Next<'_>) -> Result<axum::response::Response, HandlerError> {
        tokio::task::yield_now().await;
        match self {
            Faulty::Fail(message) => Err(HandlerError::new(*message)),
            Faulty::Panic(message) => panic!("{}", message),
        }
    }
}

/// Send one request through `router`.
pub async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    router.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn body_text(res: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(res: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
