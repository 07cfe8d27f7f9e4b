//! At most one outstanding mutation per key.
//!
//! Each [`SingleFlightMutator::mutate`] call cancels whatever was in flight
//! for the same key and spawns the new operation. Completions travel back to
//! the owner over a channel and are matched against the slot's generation in
//! [`SingleFlightMutator::complete`], so only the latest-issued operation for
//! a key can ever publish, even when an older one finished first.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::user_data::KeyedUpdate;

/// Result of a spawned mutation, posted back to the owner.
#[derive(Debug)]
pub struct MutationCompleted<K, T, E> {
    pub key: K,
    pub generation: u64,
    pub result: Result<T, E>,
}

/// What [`SingleFlightMutator::complete`] did with a current completion.
#[derive(Debug, PartialEq, Eq)]
pub enum MutationOutcome<K, T, E> {
    /// Value was broadcast to observers.
    Succeeded { key: K, value: T },
    /// Error was logged; observers keep the previous value.
    Failed { key: K, error: E },
}

#[derive(Debug)]
struct MutationSlot {
    generation: u64,
    cancel: CancellationToken,
}

pub struct SingleFlightMutator<K, T, E> {
    slots: HashMap<K, MutationSlot>,
    next_generation: u64,
    completed_tx: mpsc::UnboundedSender<MutationCompleted<K, T, E>>,
    updates: broadcast::Sender<KeyedUpdate<K, T>>,
}

impl<K, T, E> fmt::Debug for SingleFlightMutator<K, T, E>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFlightMutator")
            .field("in_flight", &self.slots.keys().collect::<Vec<_>>())
            .field("next_generation", &self.next_generation)
            .field("observers", &self.updates.receiver_count())
            .finish()
    }
}

impl<K, T, E> SingleFlightMutator<K, T, E>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
    T: Clone + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    pub fn new(
        completed_tx: mpsc::UnboundedSender<MutationCompleted<K, T, E>>,
        updates: broadcast::Sender<KeyedUpdate<K, T>>,
    ) -> Self {
        Self {
            slots: HashMap::new(),
            next_generation: 0,
            completed_tx,
            updates,
        }
    }

    /// Start `operation` for `key`, superseding any mutation already in
    /// flight for it. Returns the generation assigned to the new operation.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn mutate<F>(&mut self, key: K, operation: F) -> u64
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        if let Some(previous) = self.slots.remove(&key) {
            debug!(key = ?key, generation = previous.generation, "superseding in-flight mutation");
            previous.cancel.cancel();
        }

        self.next_generation = self.next_generation.wrapping_add(1);
        let generation = self.next_generation;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let tx = self.completed_tx.clone();
        let task_key = key.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    trace!(key = ?task_key, generation, "mutation cancelled");
                }
                result = operation => {
                    let _ = tx.send(MutationCompleted {
                        key: task_key,
                        generation,
                        result,
                    });
                }
            }
        });

        self.slots.insert(key, MutationSlot { generation, cancel });
        generation
    }

    /// Apply a completion. Stale ones (superseded or cancelled) return
    /// `None` and have no effect.
    pub fn complete(
        &mut self,
        completed: MutationCompleted<K, T, E>,
    ) -> Option<MutationOutcome<K, T, E>> {
        let current = self
            .slots
            .get(&completed.key)
            .is_some_and(|slot| slot.generation == completed.generation);
        if !current {
            trace!(
                key = ?completed.key,
                generation = completed.generation,
                "dropping stale mutation result"
            );
            return None;
        }
        self.slots.remove(&completed.key);

        match completed.result {
            Ok(value) => {
                let _ = self.updates.send(KeyedUpdate {
                    key: completed.key.clone(),
                    value: value.clone(),
                });
                debug!(key = ?completed.key, "mutation applied");
                Some(MutationOutcome::Succeeded {
                    key: completed.key,
                    value,
                })
            }
            Err(error) => {
                warn!(key = ?completed.key, %error, "mutation failed");
                Some(MutationOutcome::Failed {
                    key: completed.key,
                    error,
                })
            }
        }
    }

    /// Cancel the mutation in flight for `key`. Its result is never
    /// delivered.
    pub fn cancel(&mut self, key: &K) -> bool {
        match self.slots.remove(key) {
            Some(slot) => {
                slot.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, slot) in self.slots.drain() {
            slot.cancel.cancel();
        }
    }

    pub fn is_in_flight(&self, key: &K) -> bool {
        self.slots.contains_key(key)
    }

    pub fn in_flight_count(&self) -> usize {
        self.slots.len()
    }
}

impl<K, T, E> Drop for SingleFlightMutator<K, T, E> {
    fn drop(&mut self) {
        for slot in self.slots.values() {
            slot.cancel.cancel();
        }
    }
}
