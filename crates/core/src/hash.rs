// SPDX-License-Identifier: MIT

//! Deterministic task-set fingerprinting for drift detection: two agents
//! with identical assigned sets must produce identical hashes.

use crate::task::SchedulerKey;
use sha2::{Digest, Sha256};

/// Computes a hash over an unordered set of `(scheduler_key,
/// definition_fingerprint)` pairs. Sorting before hashing makes the result
/// independent of iteration order over the caller's map — the one
/// property the hash needs to actually hold.
pub fn project_task_hash(mut entries: Vec<(SchedulerKey, u64)>) -> String {
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    let mut hasher = Sha256::new();
    for (key, fingerprint) in &entries {
        hasher.update(key.as_str().as_bytes());
        hasher.update(0u8.to_le_bytes());
        hasher.update(fingerprint.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
#[path = "hash_tests.rs"]
mod tests;
