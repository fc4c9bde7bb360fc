// curudroid-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(curudroid::infra::io),
        help("Check file permissions or path validity under DATA_DIR/LOG_DIR.")
    )]
    Io(#[from] std::io::Error),

    #[error("JSON Error: {0}")]
    #[diagnostic(code(curudroid::infra::json))]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(curudroid::infra::config))]
    ConfigError(String),

    #[error("Configuration not found: {0}")]
    #[diagnostic(code(curudroid::infra::config_missing))]
    ConfigNotFound(String),

    #[error("Backend unavailable: {0}")]
    #[diagnostic(
        code(curudroid::infra::backend_unavailable),
        help("The advisory backend degraded to no-opinion; the pipeline proceeds unaffected.")
    )]
    BackendUnavailable(String),
}
