// curudroid-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by the business rules of the plan lifecycle. These abort a
/// single plan/intent rather than the whole process.
#[derive(Error, Debug, Diagnostic)]
pub enum GovernanceError {
    #[error("Policy file not found")]
    #[diagnostic(
        code(curudroid::domain::policy_missing),
        help("Create the allowlist at the configured policy path before starting.")
    )]
    PolicyMissing,

    #[error("Policy file malformed: {0}")]
    #[diagnostic(code(curudroid::domain::policy_malformed))]
    PolicyMalformed(String),

    #[error("Policy version field missing")]
    #[diagnostic(code(curudroid::domain::policy_version_missing))]
    PolicyVersionMissing,

    #[error("Policy lock violation: {0}")]
    #[diagnostic(
        code(curudroid::domain::policy_lock),
        help("Run with --policy-maintenance --policy-lock-init to re-pin the allowlist.")
    )]
    PolicyLockError(String),

    #[error("Plan validation failed: {field}: {reason}")]
    #[diagnostic(code(curudroid::domain::plan_validation))]
    PlanValidationError { field: String, reason: String },

    #[error("Ledger integrity violation: {0}")]
    #[diagnostic(
        code(curudroid::domain::ledger_integrity),
        help("Use --verify-ledger to locate the break, then --ledger-recover --force-recover.")
    )]
    LedgerIntegrityError(String),

    #[error("Command execution error: {0}")]
    #[diagnostic(code(curudroid::domain::command_execution))]
    CommandExecutionError(String),

    #[error("Plan execution refused: {0}")]
    #[diagnostic(code(curudroid::domain::plan_execution))]
    PlanExecutionError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainErrorKind {
    PolicyMissing,
    PolicyMalformed,
    PolicyVersionMissing,
    PolicyLockError,
    PlanValidationError,
    LedgerIntegrityError,
    CommandExecutionError,
    PlanExecutionError,
}

impl GovernanceError {
    /// Stable machine-readable kind, independent of the human message, for
    /// callers (the CLI exit-code mapper, tests) that need to branch on the
    /// taxonomy rather than string-match the Display output.
    pub fn kind(&self) -> DomainErrorKind {
        match self {
            GovernanceError::PolicyMissing => DomainErrorKind::PolicyMissing,
            GovernanceError::PolicyMalformed(_) => DomainErrorKind::PolicyMalformed,
            GovernanceError::PolicyVersionMissing => DomainErrorKind::PolicyVersionMissing,
            GovernanceError::PolicyLockError(_) => DomainErrorKind::PolicyLockError,
            GovernanceError::PlanValidationError { .. } => DomainErrorKind::PlanValidationError,
            GovernanceError::LedgerIntegrityError(_) => DomainErrorKind::LedgerIntegrityError,
            GovernanceError::CommandExecutionError(_) => DomainErrorKind::CommandExecutionError,
            GovernanceError::PlanExecutionError(_) => DomainErrorKind::PlanExecutionError,
        }
    }
}
