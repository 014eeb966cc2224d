//! Per-request dispatch from resolution outcome to response.

use std::sync::Arc;

use crate::document::{DocumentRenderer, RenderConfig};
use crate::error::Result;
use crate::outcome::{Location, RenderOutcome};
use crate::resolver::RouteResolver;

pub const NOT_FOUND_BODY: &str = "Not found";

/// What the middleware needs from an incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub path: String,
    /// Raw query without the leading `?`
    pub query: Option<String>,
}

impl RequestDescriptor {
    pub fn new(path: impl Into<String>, query: Option<String>) -> Self {
        Self {
            path: path.into(),
            query: query.filter(|q| !q.is_empty()),
        }
    }

    /// From a request target such as `/foo?a=1`.
    pub fn from_url(url: &str) -> Self {
        let location = Location::parse(url);
        let query = location.search.strip_prefix('?').map(str::to_string);
        Self::new(location.pathname, query)
    }

    pub fn location(&self) -> Location {
        Location::new(self.path.clone(), self.query.clone().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDescriptor {
    pub status: u16,
    pub body: String,
    pub location: Option<String>,
}

impl ResponseDescriptor {
    pub fn html(body: String) -> Self {
        Self {
            status: 200,
            body,
            location: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            status: 500,
            body: message,
            location: None,
        }
    }

    pub fn redirect(location: String) -> Self {
        Self {
            status: 302,
            body: String::new(),
            location: Some(location),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            body: NOT_FOUND_BODY.to_string(),
            location: None,
        }
    }

    pub fn is_redirect(&self) -> bool {
        self.location.is_some()
    }
}

/// The response surface of the host server. The middleware performs exactly
/// one terminal call (`send` or `redirect`) per request.
pub trait ResponseSink {
    fn status(&mut self, code: u16) -> &mut Self;

    fn send(&mut self, body: String);

    fn redirect(&mut self, code: u16, location: &str);
}

/// Resolves each request against the route table and answers with a
/// rendered document, a redirect, an error message or `Not found`.
#[derive(Clone)]
pub struct RenderMiddleware {
    resolver: Arc<dyn RouteResolver>,
    document: Arc<DocumentRenderer>,
}

impl RenderMiddleware {
    pub fn new(resolver: impl RouteResolver + 'static, config: RenderConfig) -> Result<Self> {
        Ok(Self {
            resolver: Arc::new(resolver),
            document: Arc::new(DocumentRenderer::new(config)?),
        })
    }

    pub fn config(&self) -> &RenderConfig {
        self.document.config()
    }

    pub async fn respond(&self, request: &RequestDescriptor) -> ResponseDescriptor {
        let location = request.location();
        let outcome = self.resolver.resolve(&location).await;

        let response = match outcome {
            RenderOutcome::Error(message) => {
                tracing::warn!("{}: resolution failed: {}", location, message);
                ResponseDescriptor::error(message)
            }
            RenderOutcome::Redirect(target) => ResponseDescriptor::redirect(target.href()),
            RenderOutcome::Matched(props) => {
                let markup = props.render();
                match self.document.render(&markup) {
                    Ok(html) => ResponseDescriptor::html(html),
                    Err(e) => {
                        tracing::warn!("{}: document assembly failed: {}", location, e);
                        ResponseDescriptor::error(e.to_string())
                    }
                }
            }
            RenderOutcome::NotFound => ResponseDescriptor::not_found(),
        };

        tracing::debug!(
            status = response.status,
            redirect = response.location.as_deref(),
            "{}",
            location
        );
        response
    }

    /// Resolve and dispatch into `sink`.
    pub async fn handle<S: ResponseSink>(&self, request: &RequestDescriptor, sink: &mut S) {
        let response = self.respond(request).await;
        match response.location {
            Some(location) => sink.redirect(response.status, &location),
            None => sink.status(response.status).send(response.body),
        }
    }
}

impl std::fmt::Debug for RenderMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderMiddleware")
            .field("config", self.config())
            .finish_non_exhaustive()
    }
}
