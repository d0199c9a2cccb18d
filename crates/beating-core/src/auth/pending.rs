//! Deferred-action store: bridges "I tried to act while logged out" to
//! "now that I'm logged in, finish what I started".
//!
//! A tiny two-state protocol (empty / armed) guarded by a destructive
//! read. At most one action is armed at a time; a new capture overwrites
//! the previous one (last-intent-wins).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::StateStore;

/// Storage key holding the armed pending action.
pub const PENDING_ACTION_KEY: &str = "auth.pendingAction";

/// A captured user intent: what they wanted to do and where to resume it.
///
/// The payload is opaque; the store never inspects its shape. The
/// destination is interpreted by the navigation layer after consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    pub payload: Value,
    pub destination: String,
}

/// Owns and exclusively mutates the pending action.
#[derive(Debug, Clone)]
pub struct DeferredActionStore {
    store: StateStore,
}

impl DeferredActionStore {
    pub fn new(store: StateStore) -> Self {
        Self { store }
    }

    /// Arms a pending action, overwriting any existing one.
    ///
    /// Call this before surfacing the login prompt, never after.
    ///
    /// # Errors
    /// Returns an error if the state store fails.
    pub fn capture(&self, payload: Value, destination: &str) -> Result<()> {
        let action = PendingAction {
            payload,
            destination: destination.to_string(),
        };
        self.store
            .set(PENDING_ACTION_KEY, serde_json::to_value(&action)?)
    }

    /// Destructively reads the armed action, if any.
    ///
    /// The clear is persisted before this returns, so a second consume
    /// never observes the same action twice. A corrupt stored value is
    /// logged, dropped, and reported as `None` — a lost deferred action
    /// degrades to "re-select", never to an error.
    ///
    /// # Errors
    /// Returns an error if the state store fails.
    pub fn consume(&self) -> Result<Option<PendingAction>> {
        match self.store.remove(PENDING_ACTION_KEY)? {
            None => Ok(None),
            Some(raw) => match serde_json::from_value(raw) {
                Ok(action) => Ok(Some(action)),
                Err(err) => {
                    tracing::warn!(error = %err, "dropping corrupt pending action");
                    Ok(None)
                }
            },
        }
    }

    /// Non-destructive read, for UI hints only. Resume logic must go
    /// through [`Self::consume`] so replay happens at most once.
    ///
    /// # Errors
    /// Returns an error if the state store fails.
    pub fn peek(&self) -> Result<Option<PendingAction>> {
        match self.store.get(PENDING_ACTION_KEY)? {
            None => Ok(None),
            Some(raw) => Ok(serde_json::from_value(raw).ok()),
        }
    }

    /// Disarms without returning; used when a logout abandons the intent.
    ///
    /// # Errors
    /// Returns an error if the state store fails.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(PENDING_ACTION_KEY)?;
        Ok(())
    }
}
