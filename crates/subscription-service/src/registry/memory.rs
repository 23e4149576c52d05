//! In-memory registry implementation.

use super::ClaimError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info};

struct PendingEntry {
    secret: String,
    issued_at: Instant,
    /// Bumped on every put so a stale claim never touches a newer entry
    generation: u64,
    confirming: bool,
}

#[derive(Default)]
struct Entries {
    by_identifier: HashMap<String, PendingEntry>,
    next_generation: u64,
}

/// Shared handle to the pending subscription registry.
///
/// Cloning is cheap; all clones see the same entries. The lock is never held
/// across an `.await`.
#[derive(Clone)]
pub struct PendingRegistry {
    entries: Arc<Mutex<Entries>>,
    ttl: Option<Duration>,
}

impl PendingRegistry {
    /// Create an empty registry. Entries older than `ttl` are treated as absent.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Entries::default())),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // Every critical section leaves the map consistent, so a poisoned
        // lock is still safe to use.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &PendingEntry, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.saturating_duration_since(entry.issued_at) >= ttl)
    }

    /// Register or overwrite the secret for `identifier`.
    pub fn put(&self, identifier: impl Into<String>, secret: impl Into<String>) {
        let mut entries = self.lock();
        entries.next_generation += 1;
        let generation = entries.next_generation;

        entries.by_identifier.insert(
            identifier.into(),
            PendingEntry {
                secret: secret.into(),
                issued_at: Instant::now(),
                generation,
                confirming: false,
            },
        );
    }

    /// Look up the live secret for `identifier`.
    pub fn get(&self, identifier: &str) -> Option<String> {
        let entries = self.lock();
        let now = Instant::now();

        entries
            .by_identifier
            .get(identifier)
            .filter(|entry| !self.is_expired(entry, now))
            .map(|entry| entry.secret.clone())
    }

    /// Drop the entry for `identifier`, if any.
    pub fn remove(&self, identifier: &str) {
        self.lock().by_identifier.remove(identifier);
    }

    /// Check `secret` against the entry for `identifier` and reserve the entry
    /// for confirmation.
    ///
    /// On success the entry stays in the registry but cannot be claimed again
    /// until the returned [`Claim`] is committed (entry consumed) or dropped
    /// (entry released for another attempt). A mismatch leaves the entry as
    /// it was.
    pub fn claim(&self, identifier: &str, secret: &str) -> Result<Claim, ClaimError> {
        let mut entries = self.lock();
        let now = Instant::now();

        let entry = entries
            .by_identifier
            .get_mut(identifier)
            .filter(|entry| !self.is_expired(entry, now))
            .ok_or(ClaimError::Unknown)?;

        if entry.confirming {
            return Err(ClaimError::InFlight);
        }
        if entry.secret != secret {
            return Err(ClaimError::Mismatch);
        }

        entry.confirming = true;

        Ok(Claim {
            registry: self.clone(),
            identifier: identifier.to_string(),
            generation: entry.generation,
            committed: false,
        })
    }

    /// Remove expired entries. Entries being confirmed are kept.
    pub fn purge_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }

        let mut entries = self.lock();
        let now = Instant::now();
        let before = entries.by_identifier.len();

        entries
            .by_identifier
            .retain(|_, entry| entry.confirming || !self.is_expired(entry, now));

        before - entries.by_identifier.len()
    }

    /// Spawn a background task that purges expired entries every `interval`.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let registry = self.clone();

        info!(?interval, ttl = ?self.ttl, "Starting pending registry sweeper");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let removed = registry.purge_expired();
                if removed > 0 {
                    debug!("Purged {} expired pending subscriptions", removed);
                }
            }
        })
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.lock().by_identifier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn finish_claim(&self, identifier: &str, generation: u64, consume: bool) {
        let mut entries = self.lock();

        let Some(entry) = entries.by_identifier.get_mut(identifier) else {
            return;
        };
        // Overwritten by a newer registration while confirming
        if entry.generation != generation {
            return;
        }

        if consume {
            entries.by_identifier.remove(identifier);
        } else {
            entry.confirming = false;
        }
    }
}

/// Exclusive reservation of a pending entry whose secret matched.
///
/// Dropping the claim without calling [`Claim::commit`] releases the entry.
#[must_use = "dropping a claim releases the pending entry"]
pub struct Claim {
    registry: PendingRegistry,
    identifier: String,
    generation: u64,
    committed: bool,
}

impl Claim {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Consume the pending entry.
    pub fn commit(mut self) {
        self.committed = true;
        self.registry
            .finish_claim(&self.identifier, self.generation, true);
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        if !self.committed {
            self.registry
                .finish_claim(&self.identifier, self.generation, false);
        }
    }
}
