pub mod build;
pub mod config;
pub mod discovery;
pub mod environment;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod render;
pub mod settings;

// Re-export main types
pub use build::*;
pub use config::*;
pub use environment::*;
pub use error::*;
pub use loader::*;
pub use manifest::*;
pub use render::*;
pub use settings::*;

pub use discovery::{CONFIG_FILE_NAMES, ConfigLoader};
