//! # duet-render
//!
//! Server-side render middleware. A request is resolved against the route
//! table exactly once and answered with one of four responses:
//!
//! | outcome  | status | body                       |
//! |----------|--------|----------------------------|
//! | error    | 500    | the resolution message     |
//! | redirect | 302    | empty, `Location` = target |
//! | matched  | 200    | the rendered HTML document |
//! | none     | 404    | `Not found`                |
//!
//! ```no_run
//! use duet_render::{DocumentAssets, RenderConfig, RenderMiddleware, RenderProps, RouteTable};
//! use duet_config::{ConfigLoader, Environment};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new(".").load()?;
//! let assets = DocumentAssets::load(&config.build.server_output_dir)?;
//! let routes = RouteTable::builder()
//!     .route("/", |_: &RenderProps| "<h1>Home</h1>".to_string())
//!     .redirect("/home", "/")
//!     .build()?;
//! let app = RenderMiddleware::new(routes, RenderConfig::from_config(&config, assets))?.into_router();
//! # let _ = app;
//! # Ok(()) }
//! ```

pub mod document;
pub mod error;
pub mod middleware;
pub mod outcome;
pub mod resolver;
pub mod routes;
pub mod service;

pub use document::{DocumentAssets, DocumentRenderer, RenderConfig};
pub use error::{RenderError, Result};
pub use middleware::{
    NOT_FOUND_BODY, RenderMiddleware, RequestDescriptor, ResponseDescriptor, ResponseSink,
};
pub use outcome::{Component, Location, RenderOutcome, RenderProps};
pub use resolver::{CallbackResolver, Completion, RouteResolver};
pub use routes::{RoutePattern, RouteTable, RouteTableBuilder};
pub use service::render_handler;
