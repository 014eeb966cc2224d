use duet_config::ConfigError;
use thiserror::Error;

/// Errors raised while setting up or running the render side.
///
/// Route resolution failures are not errors here: they are a
/// [`RenderOutcome::Error`](crate::RenderOutcome::Error) and become a 500 for
/// the one request that hit them.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid route pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Document template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Failed to load client assets: {0}")]
    Assets(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
