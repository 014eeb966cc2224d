//! axum integration: mount the middleware as a fallback handler.

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

use crate::middleware::{RenderMiddleware, RequestDescriptor, ResponseDescriptor};

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

impl IntoResponse for ResponseDescriptor {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self.location {
            Some(location) => (status, [(header::LOCATION, location)]).into_response(),
            None => (status, [(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], self.body).into_response(),
        }
    }
}

/// Handler rendering whatever route the request targets.
pub async fn render_handler(State(middleware): State<RenderMiddleware>, uri: Uri) -> ResponseDescriptor {
    let request = RequestDescriptor::new(uri.path(), uri.query().map(str::to_string));
    middleware.respond(&request).await
}

impl RenderMiddleware {
    /// A router that sends every request through the middleware. Merge it
    /// after API and static routes so they take precedence.
    pub fn into_router(self) -> Router {
        Router::new().fallback(render_handler).with_state(self)
    }
}
