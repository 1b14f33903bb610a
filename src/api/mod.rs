//! Built-in route modules.
//!
//! Every module reads the same option keys from its manifest:
//!
//! | key               | meaning                                  |
//! |-------------------|------------------------------------------|
//! | `id`              | route id (defaults to the module name)   |
//! | `endpoint`        | endpoint template                        |
//! | `order`           | bind priority                            |
//! | `require_json`    | add the `RequireJson` middleware         |
//! | `require_headers` | add one `RequireHeader` per listed name  |

pub mod echo;
pub mod health;
pub mod kv;
pub mod middleware;

use std::sync::Arc;

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use http_body_util::LengthLimitError;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::loader::{CatalogError, ConstructError, ModuleOptions, RouteCatalog};
use crate::route::{HandlerError, Middleware, RouteUnit};

use self::middleware::{RequireHeader, RequireJson};

/// Option keys shared by all built-in modules.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommonOptions {
    pub id: Option<String>,
    pub endpoint: Option<String>,
    pub order: Option<i32>,
    #[serde(default)]
    pub require_json: bool,
    #[serde(default)]
    pub require_headers: Vec<String>,
}

/// Identity, placement, and middlewares of a built-in unit.
#[derive(Clone)]
pub struct RouteSpec {
    pub id: String,
    pub endpoint: String,
    pub order: i32,
    pub middlewares: Vec<Arc<dyn Middleware>>,
}

impl RouteSpec {
    /// Apply manifest options over the module's defaults.
    pub fn from_options(
        options: &ModuleOptions,
        default_id: &str,
        default_endpoint: &str,
    ) -> Result<Self, ConstructError> {
        let common: CommonOptions = options.parse()?;

        let mut middlewares: Vec<Arc<dyn Middleware>> = Vec::new();
        for name in &common.require_headers {
            let header = RequireHeader::new(name)
                .map_err(|e| ConstructError(format!("invalid header name `{name}`: {e}")))?;
            middlewares.push(Arc::new(header));
        }
        if common.require_json {
            middlewares.push(Arc::new(RequireJson));
        }

        Ok(Self {
            id: common.id.unwrap_or_else(|| default_id.to_string()),
            endpoint: common.endpoint.unwrap_or_else(|| default_endpoint.to_string()),
            order: common.order.unwrap_or(0),
            middlewares,
        })
    }
}

/// Catalog of every built-in module.
///
/// Fails only if two built-ins share a name.
pub fn catalog() -> Result<RouteCatalog, CatalogError> {
    let mut catalog = RouteCatalog::new();
    let modules: [(&str, fn(&ModuleOptions) -> Result<Box<dyn RouteUnit>, ConstructError>); 5] = [
        ("health", health::Health::construct),
        ("echo", echo::Echo::construct),
        ("kv.get", kv::KvGet::construct),
        ("kv.put", kv::KvPut::construct),
        ("kv.delete", kv::KvDelete::construct),
    ];
    for (name, constructor) in modules {
        catalog.register(name, constructor)?;
    }
    Ok(catalog)
}

/// Why a request body could not be read as JSON.
#[derive(Debug)]
pub(crate) enum BodyError {
    /// The body limit layer cut the stream off.
    TooLarge,
    Invalid(String),
}

impl BodyError {
    /// 413 for an oversized body; any other problem is a handler failure.
    pub(crate) fn into_outcome(self) -> Result<Response, HandlerError> {
        match self {
            BodyError::TooLarge => Ok((
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "error": "Request body too large" })),
            )
                .into_response()),
            BodyError::Invalid(message) => Err(HandlerError::Body(message)),
        }
    }
}

/// Read the whole body as JSON. An empty body reads as `null`.
pub(crate) async fn read_json(body: Body) -> Result<Value, BodyError> {
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) if exceeds_limit(&e) => return Err(BodyError::TooLarge),
        Err(e) => return Err(BodyError::Invalid(e.to_string())),
    };
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|e| BodyError::Invalid(e.to_string()))
}

fn exceeds_limit(error: &axum::Error) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}
