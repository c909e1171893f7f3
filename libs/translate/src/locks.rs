//! Per-subject mutual exclusion.
//!
//! The mirror is rewritten whole on every update; two concurrent documents
//! referencing the same subject would race on that read-modify-write. Each
//! translator therefore holds the subject's lock across its read, decide,
//! write sequence. Keys are the source identifier values documents use to
//! address a subject.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct SubjectLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SubjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for a subject key, created on first use.
    pub fn lock_for(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().expect("subject lock map poisoned");
        map.entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Guards for a whole key set. A document may address one subject
    /// through several identifier values; holding every key keeps a
    /// concurrent document sharing any one of them out of the critical
    /// section. Acquisition order is sorted so overlapping sets cannot
    /// deadlock, and repeated keys are locked once.
    pub async fn lock_many(&self, keys: &[String]) -> Vec<tokio::sync::OwnedMutexGuard<()>> {
        let mut sorted: Vec<&String> = keys.iter().collect();
        sorted.sort();
        sorted.dedup();

        let mut guards = Vec::with_capacity(sorted.len());
        for key in sorted {
            guards.push(self.lock_for(key).lock_owned().await);
        }
        guards
    }
}
