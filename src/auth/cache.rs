use std::sync::Mutex;

use crate::auth::gateway::GatewayToken;
use crate::auth::session::ApiSessionToken;

/// Single-slot token cache.
///
/// The slot is shared across all in-flight requests. The lock is held only
/// for get/set, never across an await, so two requests hitting an expired
/// slot concurrently may both fetch a fresh token; the last write wins.
/// Both fetches are idempotent, so this is accepted over a fetch-level lock.
#[derive(Debug)]
pub struct TokenSlot<T: Clone> {
    slot: Mutex<Option<T>>,
}

impl<T: Clone> TokenSlot<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    pub fn get(&self) -> Option<T> {
        self.lock().clone()
    }

    pub fn set(&self, value: T) {
        *self.lock() = Some(value);
    }

    /// Evicts the cached token. Idempotent.
    pub fn clear(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<T>> {
        // A poisoned slot only means a panic elsewhere; the value is still usable.
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T: Clone> Default for TokenSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The two process-wide token caches, owned by [`crate::AppState`].
#[derive(Debug, Default)]
pub struct TokenCaches {
    pub gateway: TokenSlot<GatewayToken>,
    pub session: TokenSlot<ApiSessionToken>,
}
