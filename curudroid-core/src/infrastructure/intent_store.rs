// curudroid-core/src/infrastructure/intent_store.rs

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::domain::intent::{Intent, IntentState};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;

/// The priority queue backing Reactive Autonomy: one JSON array file,
/// rewritten whole on every mutation.
pub struct IntentQueueStore {
    path: PathBuf,
}

impl IntentQueueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        IntentQueueStore { path: path.into() }
    }

    pub fn load(&self) -> Result<Vec<Intent>, InfrastructureError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, intents: &[Intent]) -> Result<(), InfrastructureError> {
        atomic_write(&self.path, serde_json::to_string_pretty(intents)?)
    }

    /// Append an intent, assigning `id` if absent, then re-sort by
    /// descending priority.
    pub fn enqueue(&self, mut intent: Intent) -> Result<(), InfrastructureError> {
        let mut intents = self.load()?;
        if intent.id.is_none() {
            intent.id = Some(format!("intent_{}", intents.len() + 1));
        }
        intents.push(intent);
        intents.sort_by(|a, b| b.priority.cmp(&a.priority));
        self.save(&intents)
    }

    /// Take the highest-priority `pending` intent, flip it to `processing`,
    /// persist, and return it. Drains one pending intent per invocation,
    /// in priority order.
    pub fn dequeue(&self) -> Result<Option<Intent>, InfrastructureError> {
        let mut intents = self.load()?;
        let Some(idx) = intents.iter().position(|i| i.status == IntentState::Pending) else {
            return Ok(None);
        };
        intents[idx].status = IntentState::Processing;
        let taken = intents[idx].clone();
        self.save(&intents)?;
        Ok(Some(taken))
    }

    /// Overwrite the status of the intent with the given id, used once
    /// Reactive Autonomy has reached a terminal state for it.
    pub fn set_status(&self, intent_id: &str, status: IntentState) -> Result<(), InfrastructureError> {
        let mut intents = self.load()?;
        for intent in intents.iter_mut() {
            if intent.id.as_deref() == Some(intent_id) {
                intent.status = status;
            }
        }
        self.save(&intents)
    }
}

/// Selects the latest intent file from the approved-intents directory by
/// lexicographic filename order -- timestamped filenames sort
/// chronologically.
pub fn latest_approved_intent(approved_dir: &Path) -> Result<Option<(PathBuf, Intent)>, InfrastructureError> {
    if !approved_dir.exists() {
        return Ok(None);
    }

    let mut candidates: Vec<PathBuf> = WalkDir::new(approved_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    candidates.sort();

    let Some(latest) = candidates.pop() else {
        return Ok(None);
    };

    let raw = std::fs::read_to_string(&latest)?;
    let intent: Intent = serde_json::from_str(&raw)?;
    Ok(Some((latest, intent)))
}
