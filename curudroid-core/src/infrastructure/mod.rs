// curudroid-core/src/infrastructure/mod.rs

pub mod ai_transport;
pub mod config;
pub mod curupira_transport;
pub mod error;
pub mod fs;
pub mod intent_store;
pub mod ledger_store;
pub mod observability;
pub mod paths;
pub mod policy_lock_store;
pub mod policy_store;
pub mod safe_runner;

pub use config::AppConfig;
pub use error::InfrastructureError;
pub use paths::RuntimePaths;
