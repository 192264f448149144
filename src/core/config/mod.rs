pub mod app_config;
pub mod defaults;
pub mod paths;
pub mod service;
pub mod validation;

use std::path::PathBuf;

use thiserror::Error;

pub use app_config::{AppConfig, Credential};
pub use paths::AppPaths;
pub use service::ConfigService;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingCredential(&'static str),

    #[error("{0}")]
    Invalid(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
