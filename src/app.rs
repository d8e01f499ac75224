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

//! Application wiring
//!
//! `BiblioApp` assembles the pieces in dependency order: token store,
//! session handle, HTTP client, session manager and book store, then spawns
//! the watcher that keeps the book lists in step with the session.

use crate::api::client::{BiblioClient, ClientConfig};
use crate::error::Result;
use crate::state::books::BookStore;
use crate::state::session::{SessionHandle, SessionManager, SessionState};
use crate::storage::{Database, TokenStore};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Fully wired client application
pub struct BiblioApp {
    client: Arc<BiblioClient>,
    session: SessionManager,
    books: Arc<BookStore>,
    watcher: JoinHandle<()>,
}

impl BiblioApp {
    /// Wire the application against an opened database
    ///
    /// Reads the persisted token as part of startup, so the session state
    /// is settled (active or inactive) by the time this returns. If a token
    /// was present, the spawned watcher fetches both book lists.
    pub async fn connect(config: ClientConfig, database: &Database) -> Result<Self> {
        let handle = SessionHandle::new(TokenStore::new(database));
        let client = Arc::new(BiblioClient::with_config(Arc::clone(&handle), config)?);
        let books = BookStore::new(Arc::clone(&client), Arc::clone(&handle));
        let watcher = books.spawn_session_watcher(handle.subscribe());
        let session = SessionManager::new(Arc::clone(&client), handle);

        let state = session.initialize().await;
        info!(?state, "application connected");

        Ok(Self {
            client,
            session,
            books,
            watcher,
        })
    }

    /// The raw API client, for callers that bypass the stores
    pub fn client(&self) -> &Arc<BiblioClient> {
        &self.client
    }

    /// Session lifecycle operations
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Book collections and operations
    pub fn books(&self) -> &Arc<BookStore> {
        &self.books
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Stop the session watcher task
    pub fn shutdown(self) {
        self.watcher.abort();
    }
}
