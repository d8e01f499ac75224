// Biblio - Mobile Library Client
// Copyright (C) 2025 Biblio contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Session state and token lifecycle
//!
//! The session is a single optional opaque token: absent at cold start,
//! loaded from the device store at startup, set on login, cleared on logout
//! or on any 401 response. `SessionHandle` is the shared piece consulted by
//! the transport on every request; `SessionManager` drives the lifecycle
//! over the auth endpoints.
//!
//! State transitions are published on a watch channel so that consumers
//! (the book store, screens) can react to activation and deactivation
//! without polling.

use crate::api::auth::Credentials;
use crate::api::client::BiblioClient;
use crate::error::{BiblioError, Result};
use crate::storage::TokenStore;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Session lifecycle state
///
/// `Loading` is held only during the startup read of the persisted token
/// and during in-flight login/logout calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Inactive,
    Active,
}

/// Shared session handle: token source for the transport, 401 sink
///
/// Exclusively owns the token's lifecycle. The persisted token and the
/// published state are updated together but not transactionally; a crash
/// between the two is acceptable for this class of client.
#[derive(Debug)]
pub struct SessionHandle {
    store: TokenStore,
    state_tx: watch::Sender<SessionState>,
}

impl SessionHandle {
    pub fn new(store: TokenStore) -> Arc<Self> {
        let (state_tx, _) = watch::channel(SessionState::Loading);
        Arc::new(Self { store, state_tx })
    }

    /// Read the currently persisted token, if any
    ///
    /// Consulted by the transport for every outgoing request, so the
    /// attached credential always reflects the persisted state.
    pub async fn bearer_token(&self) -> Result<Option<String>> {
        self.store.load().await
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Subscribe to session state transitions
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Persist a token and mark the session active
    pub async fn activate(&self, token: &str) -> Result<()> {
        self.store.save(token).await?;
        self.set_state(SessionState::Active);
        Ok(())
    }

    /// Clear the persisted token and mark the session inactive
    ///
    /// Best-effort: a failing store never blocks deactivation. Called by
    /// the transport on 401 and by logout.
    pub async fn invalidate(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "failed to clear persisted token");
        }
        self.set_state(SessionState::Inactive);
    }

    pub(crate) fn set_state(&self, state: SessionState) {
        self.state_tx.send_replace(state);
    }
}

/// Drives the session lifecycle over the auth endpoints
pub struct SessionManager {
    client: Arc<BiblioClient>,
    handle: Arc<SessionHandle>,
}

impl SessionManager {
    pub fn new(client: Arc<BiblioClient>, handle: Arc<SessionHandle>) -> Self {
        Self { client, handle }
    }

    /// Startup read of the persisted token
    ///
    /// A present token activates the session without backend re-validation;
    /// validity is discovered lazily on the first authenticated call via
    /// the 401 handler. A failing read logs and leaves the session inactive.
    pub async fn initialize(&self) -> SessionState {
        self.handle.set_state(SessionState::Loading);
        let state = match self.handle.bearer_token().await {
            Ok(Some(_)) => SessionState::Active,
            Ok(None) => SessionState::Inactive,
            Err(e) => {
                warn!(error = %e, "failed to load persisted token");
                SessionState::Inactive
            }
        };
        self.handle.set_state(state);
        debug!(?state, "session initialized");
        state
    }

    /// Log in and persist the returned token
    ///
    /// On failure the error propagates and the session state is left as it
    /// was (a 401 from the transport has already demoted it).
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let previous = self.handle.state();
        self.handle.set_state(SessionState::Loading);

        match self
            .client
            .login(&Credentials::new(username, password))
            .await
        {
            Ok(response) => {
                if let Err(e) = self.handle.activate(&response.token).await {
                    // Token persist failure: the session must not be left
                    // parked in Loading, which also disables fetches.
                    if self.handle.state() == SessionState::Loading {
                        self.handle.set_state(previous);
                    }
                    return Err(e);
                }
                Ok(())
            }
            Err(e) => {
                // Restore the previous state unless the transport already
                // moved it (401 handling sets Inactive).
                if self.handle.state() == SessionState::Loading {
                    self.handle.set_state(previous);
                }
                // A 401 on this endpoint means rejected credentials, not an
                // expired session.
                match e {
                    BiblioError::Unauthorized { .. } => {
                        Err(BiblioError::auth_failed("invalid username or password"))
                    }
                    other => Err(other),
                }
            }
        }
    }

    /// Create an account
    ///
    /// Does not establish a session; callers log in separately.
    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        self.client
            .register(&Credentials::new(username, password))
            .await
    }

    /// Log out
    ///
    /// The backend call is best-effort: a failure is logged, never
    /// propagated. The persisted token is cleared and the session marked
    /// inactive unconditionally.
    pub async fn logout(&self) {
        self.handle.set_state(SessionState::Loading);
        if let Err(e) = self.client.logout().await {
            warn!(error = %e, "logout request failed, clearing local session anyway");
        }
        self.handle.invalidate().await;
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.handle.state()
    }

    /// Whether the session is currently active
    pub fn is_active(&self) -> bool {
        self.handle.state() == SessionState::Active
    }

    /// Subscribe to session state transitions
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.handle.subscribe()
    }
}
