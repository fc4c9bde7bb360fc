// curudroid-core/src/domain/mod.rs

pub mod ai_advisor;
pub mod error;
pub mod evaluator;
pub mod execution_report;
pub mod intent;
pub mod ledger;
pub mod plan;
pub mod plugin;
pub mod policy;
pub mod policy_lock;

// Re-exports pratiques pour simplifier les imports ailleurs
pub use ai_advisor::{AiRecommendation, RawAdvisorResponse, RiskAssessment, RiskLevel, SuggestedAction};
pub use error::GovernanceError;
pub use evaluator::{Decision, MaxMode};
pub use execution_report::{CommandResult, ExecutionMode, ExecutionReport};
pub use intent::{Intent, IntentState};
pub use ledger::{LedgerEntry, LedgerEntryCore};
pub use plan::{Command, CommandType, Plan};
pub use plugin::{Plugin, PluginCommand, PluginContractError, PluginMetadata, PluginRunResult};
pub use policy::Policy;
pub use policy_lock::PolicyLock;
