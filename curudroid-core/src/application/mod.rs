// curudroid-core/src/application/mod.rs

pub mod ai_advisor_service;
pub mod curupira;
pub mod executor;
pub mod plan_generator;
pub mod plan_validator;
pub mod plugin_registry;
pub mod preflight;
pub mod reactive_autonomy;
pub mod supervisor;

pub use ai_advisor_service::AiAdvisorService;
pub use executor::{ExecutorPaths, execute};
pub use plan_generator::{generate_plan, GeneratedArtifact};
pub use plugin_registry::{check_registration, PluginKind, PluginStatus};
pub use preflight::{run_preflight, PreflightReport};
pub use reactive_autonomy::{process_next_intent, ReactiveOutcome};
