// curudroid-core/src/error.rs

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::error::GovernanceError;
use crate::infrastructure::error::InfrastructureError;

/// Facade error type re-exported at the crate root, unifying the domain and
/// infrastructure error tiers. Lets the CLI use a single `?`-friendly
/// return type across both.
#[derive(Error, Debug, Diagnostic)]
pub enum CurudroidError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Governance(#[from] GovernanceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),
}
