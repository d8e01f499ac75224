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

//! In-memory book collections
//!
//! Two lists are maintained per session: the available catalog and the
//! user's borrowed books. Every mutation goes through the backend first;
//! the lists are only patched from a successful response, so an error
//! leaves them exactly as they were.
//!
//! List contents never survive the session: activation triggers a fetch of
//! both lists, deactivation empties them.

use crate::api::books::{Book, BookCreateRequest, BookUpdateRequest};
use crate::api::client::BiblioClient;
use crate::error::Result;
use crate::state::session::{SessionHandle, SessionState};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::debug;

#[derive(Debug, Default)]
struct Shelf {
    available: Vec<Book>,
    borrowed: Vec<Book>,
    is_loading: bool,
    error: Option<String>,
    // Fetch generations: a refetch bumps the counter, and a completed
    // fetch only installs its result while its generation is still the
    // latest. Stale responses are dropped, never merged.
    available_gen: u64,
    borrowed_gen: u64,
}

/// Session-scoped store for the book collections
pub struct BookStore {
    client: Arc<BiblioClient>,
    session: Arc<SessionHandle>,
    shelf: Mutex<Shelf>,
}

impl BookStore {
    pub fn new(client: Arc<BiblioClient>, session: Arc<SessionHandle>) -> Arc<Self> {
        Arc::new(Self {
            client,
            session,
            shelf: Mutex::new(Shelf::default()),
        })
    }

    /// Run one backend operation with loading/error bookkeeping
    ///
    /// Loading is set and the previous error cleared before the call. On
    /// failure the error message is recorded and `None` returned; the lists
    /// themselves are never touched here.
    async fn with_async<T, F>(&self, operation: F) -> Option<T>
    where
        F: Future<Output = Result<T>>,
    {
        {
            let mut shelf = self.shelf.lock().await;
            shelf.is_loading = true;
            shelf.error = None;
        }

        let result = operation.await;

        let mut shelf = self.shelf.lock().await;
        shelf.is_loading = false;
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                let message = e.to_string();
                debug!(error = %message, "book operation failed");
                shelf.error = Some(if message.is_empty() {
                    "operation failed".to_string()
                } else {
                    message
                });
                None
            }
        }
    }

    /// Refresh the available catalog
    ///
    /// A no-op while the session is not active. Overlapping refreshes are
    /// fenced by generation; only the newest result is installed.
    pub async fn fetch_books(&self) {
        if self.session.state() != SessionState::Active {
            return;
        }

        let generation = {
            let mut shelf = self.shelf.lock().await;
            shelf.available_gen = shelf.available_gen.wrapping_add(1);
            shelf.available_gen
        };

        if let Some(books) = self.with_async(self.client.list_books()).await {
            let mut shelf = self.shelf.lock().await;
            if shelf.available_gen == generation {
                shelf.available = books;
            } else {
                debug!(generation, "dropping stale catalog fetch");
            }
        }
    }

    /// Refresh the borrowed list
    ///
    /// Same no-op and fencing rules as `fetch_books`.
    pub async fn fetch_borrowed_books(&self) {
        if self.session.state() != SessionState::Active {
            return;
        }

        let generation = {
            let mut shelf = self.shelf.lock().await;
            shelf.borrowed_gen = shelf.borrowed_gen.wrapping_add(1);
            shelf.borrowed_gen
        };

        if let Some(books) = self.with_async(self.client.list_borrowed_books()).await {
            let mut shelf = self.shelf.lock().await;
            if shelf.borrowed_gen == generation {
                shelf.borrowed = books;
            } else {
                debug!(generation, "dropping stale borrowed fetch");
            }
        }
    }

    /// Fetch one book by id without touching the lists
    pub async fn get_book(&self, id: i64) -> Option<Book> {
        self.with_async(self.client.get_book(id)).await
    }

    /// Create a book and append it to the available catalog
    pub async fn create_book(&self, request: &BookCreateRequest) -> Option<Book> {
        let book = self.with_async(self.client.create_book(request)).await?;

        let mut shelf = self.shelf.lock().await;
        shelf.available.push(book.clone());
        Some(book)
    }

    /// Update a book, patching it wherever it appears
    ///
    /// The updated object replaces the old one in both lists; a book that
    /// appears in neither leaves them unchanged.
    pub async fn update_book(&self, request: &BookUpdateRequest) -> Option<Book> {
        let book = self.with_async(self.client.update_book(request)).await?;

        let mut shelf = self.shelf.lock().await;
        replace_by_id(&mut shelf.available, &book);
        replace_by_id(&mut shelf.borrowed, &book);
        Some(book)
    }

    /// Delete a book and drop it from both lists
    pub async fn delete_book(&self, id: i64) -> bool {
        if self.with_async(self.client.delete_book(id)).await.is_none() {
            return false;
        }

        let mut shelf = self.shelf.lock().await;
        shelf.available.retain(|b| b.id != id);
        shelf.borrowed.retain(|b| b.id != id);
        true
    }

    /// Borrow a book, moving it from available to borrowed
    ///
    /// The stored copy is forced unavailable regardless of what the backend
    /// echoed, so the lists never show a borrowed book as available.
    pub async fn borrow_book(&self, id: i64) -> Option<Book> {
        let mut book = self.with_async(self.client.borrow_book(id)).await?;
        book.available = Some(false);

        let mut shelf = self.shelf.lock().await;
        shelf.available.retain(|b| b.id != id);
        upsert_by_id(&mut shelf.borrowed, book.clone());
        Some(book)
    }

    /// Return a book, moving it from borrowed back to available
    ///
    /// Mirror of `borrow_book`: the stored copy is forced available.
    pub async fn return_book(&self, id: i64) -> Option<Book> {
        let mut book = self.with_async(self.client.return_book(id)).await?;
        book.available = Some(true);

        let mut shelf = self.shelf.lock().await;
        shelf.borrowed.retain(|b| b.id != id);
        upsert_by_id(&mut shelf.available, book.clone());
        Some(book)
    }

    /// Empty both lists and reset loading/error state
    pub async fn clear(&self) {
        let mut shelf = self.shelf.lock().await;
        shelf.available.clear();
        shelf.borrowed.clear();
        shelf.is_loading = false;
        shelf.error = None;
        // Invalidate any in-flight fetches started before the clear.
        shelf.available_gen = shelf.available_gen.wrapping_add(1);
        shelf.borrowed_gen = shelf.borrowed_gen.wrapping_add(1);
    }

    /// Snapshot of the available catalog
    pub async fn books(&self) -> Vec<Book> {
        self.shelf.lock().await.available.clone()
    }

    /// Snapshot of the borrowed list
    pub async fn borrowed_books(&self) -> Vec<Book> {
        self.shelf.lock().await.borrowed.clone()
    }

    /// Whether a backend operation is in flight
    pub async fn is_loading(&self) -> bool {
        self.shelf.lock().await.is_loading
    }

    /// Message of the last failed operation, if any
    pub async fn error(&self) -> Option<String> {
        self.shelf.lock().await.error.clone()
    }

    /// Spawn a task that keeps the lists in step with the session
    ///
    /// Activation fetches both lists; deactivation empties them. The task
    /// ends when the session handle is dropped.
    pub fn spawn_session_watcher(
        self: &Arc<Self>,
        mut rx: watch::Receiver<SessionState>,
    ) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                let state = *rx.borrow_and_update();
                match state {
                    SessionState::Active => {
                        store.fetch_books().await;
                        store.fetch_borrowed_books().await;
                    }
                    SessionState::Inactive => store.clear().await,
                    SessionState::Loading => {}
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}

fn replace_by_id(list: &mut [Book], book: &Book) {
    if let Some(slot) = list.iter_mut().find(|b| b.id == book.id) {
        *slot = book.clone();
    }
}

fn upsert_by_id(list: &mut Vec<Book>, book: Book) {
    match list.iter_mut().find(|b| b.id == book.id) {
        Some(slot) => *slot = book,
        None => list.push(book),
    }
}
