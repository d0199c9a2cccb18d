//! Session lifecycle: the single source of truth for "who is logged in".
//!
//! State machine: `Loading` at construction, exited exactly once by
//! [`SessionManager::initialize`] into `Authenticated` or
//! `Unauthenticated`; after that `login`/`logout` move between the two.
//! There is no path back into `Loading`.

use anyhow::Result;
use serde_json::Value;

use crate::auth::token::{self, CredentialError};
use crate::storage::StateStore;

/// Storage key holding the raw bearer credential.
pub const CREDENTIAL_KEY: &str = "auth.credential";

/// Minimal subject information derived from a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub handle: String,
}

/// Snapshot of the current session, replaced wholesale on every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub authenticated: bool,
    pub identity: Option<Identity>,
}

/// Internal session state, including the pre-initialize `Loading` phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// `initialize` has not run yet; gated views must not render on this.
    Loading,
    Authenticated(Identity),
    Unauthenticated,
}

type Observer = Box<dyn FnMut(&Session)>;

/// Owns and exclusively mutates the session.
pub struct SessionManager {
    store: StateStore,
    state: SessionState,
    observers: Vec<Observer>,
}

impl SessionManager {
    /// Creates a manager in the `Loading` state over the given store.
    pub fn new(store: StateStore) -> Self {
        Self {
            store,
            state: SessionState::Loading,
            observers: Vec::new(),
        }
    }

    /// Settles the session from any persisted credential.
    ///
    /// A malformed or expired credential is evicted from storage and the
    /// session becomes unauthenticated; the cause is logged, never
    /// surfaced. Calling this after the first time is a no-op that
    /// returns the current snapshot.
    ///
    /// # Errors
    /// Returns an error only if the state store itself fails.
    pub fn initialize(&mut self) -> Result<Session> {
        if self.state != SessionState::Loading {
            return Ok(self.current());
        }

        self.state = match self.store.get(CREDENTIAL_KEY)? {
            None => {
                tracing::debug!("no stored credential");
                SessionState::Unauthenticated
            }
            Some(Value::String(raw)) => {
                match token::decode(&raw).and_then(|c| c.validate(token::now_millis())) {
                    Ok(claims) => SessionState::Authenticated(Identity {
                        id: claims.id,
                        handle: claims.handle,
                    }),
                    Err(err) => {
                        match &err {
                            CredentialError::Malformed(_) => {
                                tracing::warn!(error = %err, "discarding stored credential");
                            }
                            CredentialError::Expired { .. } => {
                                tracing::info!(error = %err, "stored credential expired");
                            }
                        }
                        self.store.remove(CREDENTIAL_KEY)?;
                        SessionState::Unauthenticated
                    }
                }
            }
            Some(other) => {
                tracing::warn!(
                    found = %other,
                    "stored credential is not a string; discarding"
                );
                self.store.remove(CREDENTIAL_KEY)?;
                SessionState::Unauthenticated
            }
        };

        Ok(self.current())
    }

    /// Commits an acquired credential and identity.
    ///
    /// Persists first; state is untouched if the write fails. Observers
    /// are notified synchronously before this returns. No network I/O
    /// happens here — acquisition is the API client's job.
    ///
    /// # Errors
    /// Returns an error if the credential cannot be persisted.
    pub fn login(&mut self, credential: &str, identity: Identity) -> Result<()> {
        self.store
            .set(CREDENTIAL_KEY, Value::String(credential.to_string()))?;
        self.state = SessionState::Authenticated(identity);
        self.notify();
        Ok(())
    }

    /// Erases the persisted credential and becomes unauthenticated.
    ///
    /// Idempotent: returns `true` when a session or stored credential was
    /// actually cleared, `false` on a no-op repeat. Observers are only
    /// notified when something was cleared.
    ///
    /// # Errors
    /// Returns an error if the state store fails.
    pub fn logout(&mut self) -> Result<bool> {
        let was_authenticated = matches!(self.state, SessionState::Authenticated(_));
        let had_credential = self.store.remove(CREDENTIAL_KEY)?.is_some();

        self.state = SessionState::Unauthenticated;
        if was_authenticated || had_credential {
            self.notify();
        }
        Ok(was_authenticated || had_credential)
    }

    /// Returns the current session snapshot; never blocks, never errors.
    ///
    /// While `Loading` this reports unauthenticated; use [`Self::state`]
    /// to distinguish that phase and avoid a flash of logged-out UI.
    pub fn current(&self) -> Session {
        match &self.state {
            SessionState::Authenticated(identity) => Session {
                authenticated: true,
                identity: Some(identity.clone()),
            },
            SessionState::Loading | SessionState::Unauthenticated => Session {
                authenticated: false,
                identity: None,
            },
        }
    }

    /// Returns the full state, including `Loading`.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Registers an observer invoked synchronously on every login/logout
    /// transition with the new snapshot.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&Session) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self) {
        let snapshot = self.current();
        for observer in &mut self.observers {
            observer(&snapshot);
        }
    }
}
