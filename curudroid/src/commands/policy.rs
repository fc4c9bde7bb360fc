// curudroid/src/commands/policy.rs
//
// USE CASE: Policy Lock maintenance -- pin the allowlist's current
// (hash, version) pair. Only reachable with --policy-maintenance; lock
// mutation is refused outside maintenance mode.

use curudroid_core::infrastructure::error::InfrastructureError;
use curudroid_core::infrastructure::policy_store::load_policy;
use curudroid_core::infrastructure::{policy_lock_store, RuntimePaths};

pub fn lock_init(paths: &RuntimePaths) -> Result<(), InfrastructureError> {
    let (policy, policy_sha256) = load_policy(&paths.policy_path)?;
    policy_lock_store::initialize(&paths.policy_lock_path, &policy_sha256, &policy.version)?;
    println!(
        "policy lock initialized: version={} sha256={}",
        policy.version, policy_sha256
    );
    Ok(())
}

pub fn announce_maintenance_mode() {
    println!("policy maintenance mode: lock verification skipped for this invocation");
}
