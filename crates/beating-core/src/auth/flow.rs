//! Auth-flow coordinator: composes the session manager and the
//! deferred-action store for the views.
//!
//! The flow it encodes: a view asks [`AuthFlowCoordinator::gate`] before a
//! protected action; if login is required the intent is already captured
//! when the prompt is surfaced. After credentials are acquired,
//! [`AuthFlowCoordinator::complete_login`] commits the session and hands
//! back the intent to replay, exactly once.

use anyhow::Result;
use serde_json::Value;

use crate::auth::pending::{DeferredActionStore, PendingAction};
use crate::auth::session::{Identity, Session, SessionManager};
use crate::storage::StateStore;

/// Outcome of gating a protected action on the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Proceed now, as this identity.
    Allowed(Identity),
    /// The intent was captured; surface the login prompt.
    LoginRequired,
}

/// The composition of the two auth singletons.
pub struct AuthFlowCoordinator {
    pub session: SessionManager,
    pub pending: DeferredActionStore,
}

impl AuthFlowCoordinator {
    /// Builds both singletons over a shared state store.
    pub fn new(store: StateStore) -> Self {
        Self {
            session: SessionManager::new(store.clone()),
            pending: DeferredActionStore::new(store),
        }
    }

    /// Settles the session from persisted state; call once before gating
    /// anything on it.
    ///
    /// # Errors
    /// Returns an error if the state store fails.
    pub fn initialize(&mut self) -> Result<Session> {
        self.session.initialize()
    }

    /// Gates a protected action. When unauthenticated, captures the
    /// intent (overwriting any previous one) so it survives the login
    /// interstitial. Dismissing the prompt afterwards leaves it armed.
    ///
    /// # Errors
    /// Returns an error if the state store fails.
    pub fn gate(&mut self, payload: Value, destination: &str) -> Result<Gate> {
        if let Some(identity) = self.session.current().identity {
            return Ok(Gate::Allowed(identity));
        }
        self.pending.capture(payload, destination)?;
        Ok(Gate::LoginRequired)
    }

    /// Commits acquired credentials and returns the intent to replay, if
    /// one was armed. Login completes before the consume, so the resuming
    /// view already observes an authenticated session.
    ///
    /// # Errors
    /// Returns an error if the state store fails.
    pub fn complete_login(
        &mut self,
        credential: &str,
        identity: Identity,
    ) -> Result<Option<PendingAction>> {
        self.session.login(credential, identity)?;
        self.pending.consume()
    }

    /// Logs out and abandons any armed intent.
    ///
    /// Returns `true` when a session was actually cleared; idempotent.
    ///
    /// # Errors
    /// Returns an error if the state store fails.
    pub fn logout(&mut self) -> Result<bool> {
        let cleared = self.session.logout()?;
        self.pending.clear()?;
        Ok(cleared)
    }
}
