// curudroid/src/commands/autonomy.rs
//
// USE CASE: Drain one intent from the reactive queue.

use curudroid_core::application::{process_next_intent, ReactiveOutcome};
use curudroid_core::infrastructure::error::InfrastructureError;
use curudroid_core::infrastructure::intent_store::IntentQueueStore;
use curudroid_core::infrastructure::{AppConfig, RuntimePaths};

pub async fn execute(config: &AppConfig, paths: &RuntimePaths) -> Result<ReactiveOutcome, InfrastructureError> {
    let queue = IntentQueueStore::new(paths.intents_queue_path.clone());
    let outcome = process_next_intent(config, &queue, &paths.decisions_path, &paths.metrics_path).await?;

    match &outcome {
        ReactiveOutcome::Empty => println!("reactive autonomy: queue empty"),
        ReactiveOutcome::InvalidIntent => println!("reactive autonomy: intent failed structural validation"),
        ReactiveOutcome::InvalidPlan => println!("reactive autonomy: referenced plan missing or invalid"),
        ReactiveOutcome::Blocked => println!("reactive autonomy: intent blocked by a risk gate"),
        ReactiveOutcome::ApprovedForDryRun => println!("reactive autonomy: intent approved for dry-run"),
    }

    Ok(outcome)
}
