//! HTTP verbs a route unit can bind to.

use std::fmt;
use std::str::FromStr;

use axum::handler::Handler;
use axum::routing::{self, MethodRouter};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The fixed set of verbs a route may declare.
///
/// `All` binds every method on the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    All,
}

/// Returned when a string does not name a known verb.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown HTTP verb: {0}")]
pub struct VerbParseError(pub String);

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
            Verb::Head => "HEAD",
            Verb::Options => "OPTIONS",
            Verb::All => "ALL",
        }
    }

    /// Wrap `handler` in a method router that only answers this verb.
    pub fn method_router<H, T, S>(self, handler: H) -> MethodRouter<S>
    where
        H: Handler<T, S>,
        T: 'static,
        S: Clone + Send + Sync + 'static,
    {
        match self {
            Verb::Get => routing::get(handler),
            Verb::Post => routing::post(handler),
            Verb::Put => routing::put(handler),
            Verb::Patch => routing::patch(handler),
            Verb::Delete => routing::delete(handler),
            Verb::Head => routing::head(handler),
            Verb::Options => routing::options(handler),
            Verb::All => routing::any(handler),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = VerbParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Verb::Get),
            "POST" => Ok(Verb::Post),
            "PUT" => Ok(Verb::Put),
            "PATCH" => Ok(Verb::Patch),
            "DELETE" => Ok(Verb::Delete),
            "HEAD" => Ok(Verb::Head),
            "OPTIONS" => Ok(Verb::Options),
            "ALL" | "ANY" => Ok(Verb::All),
            _ => Err(VerbParseError(s.to_string())),
        }
    }
}
