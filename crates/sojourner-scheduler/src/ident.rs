//! Collision-checked job identifier generation.

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::error::{Result, SchedulerError};
use crate::store::JobStore;

/// Length of generated job identifiers.
pub const ID_LEN: usize = 8;

/// Upper bound on collision retries before giving up.
pub const MAX_ATTEMPTS: u32 = 100;

/// Produce one random candidate identifier (`[A-Za-z0-9]{8}`).
fn random_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}

/// Generate an identifier that is not currently present in `store`.
///
/// Draws up to [`MAX_ATTEMPTS`] candidates, checking each against the store,
/// and fails with `CollisionExhausted` when every draw collided. Store
/// lookup failures propagate.
pub fn generate(store: &JobStore) -> Result<String> {
    generate_with(store, random_id)
}

/// Counted retry loop over an arbitrary candidate source.
fn generate_with<F>(store: &JobStore, mut next_candidate: F) -> Result<String>
where
    F: FnMut() -> String,
{
    for _ in 0..MAX_ATTEMPTS {
        let candidate = next_candidate();
        if store.get(&candidate)?.is_none() {
            return Ok(candidate);
        }
    }
    Err(SchedulerError::CollisionExhausted {
        attempts: MAX_ATTEMPTS,
    })
}
