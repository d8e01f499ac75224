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

//! In-process mock of the library backend
//!
//! Reproduces the wire behavior the client is written against: JSON for
//! books and the login token, bare text confirmations for register, logout,
//! borrow and return, and 401 with a text body for missing or revoked
//! tokens.

// Not every test crate uses every helper.
#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
struct MockBook {
    id: i64,
    title: String,
    author: String,
    description: String,
    available: bool,
    borrowed_by: Option<String>,
}

impl MockBook {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "author": self.author,
            "description": self.description,
            "available": self.available,
            "borrowedBy": self.borrowed_by,
        })
    }
}

#[derive(Debug, Default)]
struct MockState {
    users: HashMap<String, String>,
    tokens: HashMap<String, String>,
    books: Vec<MockBook>,
    next_book_id: i64,
    next_token: u64,
    // One-shot delay for the next catalog listing, to stage slow responses.
    list_delay: Option<Duration>,
}

type SharedState = Arc<Mutex<MockState>>;

/// Running mock backend bound to an ephemeral local port
pub struct MockBackend {
    addr: SocketAddr,
    state: SharedState,
}

impl MockBackend {
    pub async fn spawn() -> Self {
        let state: SharedState = Arc::default();

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/auth/logout", post(logout))
            .route("/api/livres", get(list_books).post(create_book))
            .route("/api/livres/emprunts", get(list_borrowed))
            .route(
                "/api/livres/{id}",
                get(get_book).put(update_book).delete(delete_book),
            )
            .route("/api/livres/{id}/emprunt", post(borrow_book))
            .route("/api/livres/{id}/retour", post(return_book))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock backend");
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn seed_user(&self, username: &str, password: &str) {
        let mut state = self.state.lock().unwrap();
        state.users.insert(username.to_string(), password.to_string());
    }

    pub fn seed_book(&self, title: &str, author: &str, description: &str) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_book_id + 1;
        state.next_book_id = id;
        state.books.push(MockBook {
            id,
            title: title.to_string(),
            author: author.to_string(),
            description: description.to_string(),
            available: true,
            borrowed_by: None,
        });
        id
    }

    pub fn seed_borrowed_book(&self, title: &str, author: &str, borrowed_by: &str) -> i64 {
        let id = self.seed_book(title, author, "");
        let mut state = self.state.lock().unwrap();
        let book = state.books.iter_mut().find(|b| b.id == id).unwrap();
        book.available = false;
        book.borrowed_by = Some(borrowed_by.to_string());
        id
    }

    /// Hold the next catalog listing for `delay` before answering
    ///
    /// The answered snapshot is taken when the request arrives, so a
    /// delayed listing carries data that may be stale by the time it lands.
    pub fn delay_next_list(&self, delay: Duration) {
        self.state.lock().unwrap().list_delay = Some(delay);
    }

    /// Drop every issued token, as a server-side session expiry would
    pub fn revoke_tokens(&self) {
        self.state.lock().unwrap().tokens.clear();
    }

    pub fn book_count(&self) -> usize {
        self.state.lock().unwrap().books.len()
    }
}

fn authenticated_user(state: &MockState, headers: &HeaderMap) -> Option<String> {
    let token = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;
    state.tokens.get(token).cloned()
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Error: Unauthorized").into_response()
}

async fn login(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();

    match state.users.get(&username) {
        Some(stored) if stored == password => {
            state.next_token += 1;
            let token = format!("token-{}", state.next_token);
            state.tokens.insert(token.clone(), username);
            Json(json!({ "token": token })).into_response()
        }
        _ => (StatusCode::UNAUTHORIZED, "Error: Invalid credentials").into_response(),
    }
}

async fn register(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();

    if state.users.contains_key(&username) {
        return (StatusCode::BAD_REQUEST, "Error: Username is already taken!").into_response();
    }
    state.users.insert(username, password);
    "User registered successfully!".into_response()
}

async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap();
    if authenticated_user(&state, &headers).is_none() {
        return unauthorized();
    }
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        state.tokens.remove(token);
    }
    "Logged out successfully".into_response()
}

async fn list_books(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    // Snapshot before any staged delay; the guard must not live across it.
    let (delay, books) = {
        let mut state = state.lock().unwrap();
        if authenticated_user(&state, &headers).is_none() {
            return unauthorized();
        }
        let books: Vec<Value> = state
            .books
            .iter()
            .filter(|b| b.available)
            .map(MockBook::to_json)
            .collect();
        (state.list_delay.take(), books)
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    Json(books).into_response()
}

async fn list_borrowed(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    let Some(user) = authenticated_user(&state, &headers) else {
        return unauthorized();
    };
    let books: Vec<Value> = state
        .books
        .iter()
        .filter(|b| b.borrowed_by.as_deref() == Some(user.as_str()))
        .map(MockBook::to_json)
        .collect();
    Json(books).into_response()
}

async fn get_book(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let state = state.lock().unwrap();
    if authenticated_user(&state, &headers).is_none() {
        return unauthorized();
    }
    match state.books.iter().find(|b| b.id == id) {
        Some(book) => Json(book.to_json()).into_response(),
        None => (StatusCode::NOT_FOUND, "Error: Book not found").into_response(),
    }
}

async fn create_book(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if authenticated_user(&state, &headers).is_none() {
        return unauthorized();
    }
    let id = state.next_book_id + 1;
    state.next_book_id = id;
    let book = MockBook {
        id,
        title: body["title"].as_str().unwrap_or_default().to_string(),
        author: body["author"].as_str().unwrap_or_default().to_string(),
        description: body["description"].as_str().unwrap_or_default().to_string(),
        available: true,
        borrowed_by: None,
    };
    let json = book.to_json();
    state.books.push(book);
    Json(json).into_response()
}

async fn update_book(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if authenticated_user(&state, &headers).is_none() {
        return unauthorized();
    }
    match state.books.iter_mut().find(|b| b.id == id) {
        Some(book) => {
            book.title = body["title"].as_str().unwrap_or_default().to_string();
            book.author = body["author"].as_str().unwrap_or_default().to_string();
            book.description = body["description"].as_str().unwrap_or_default().to_string();
            Json(book.to_json()).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Error: Book not found").into_response(),
    }
}

async fn delete_book(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = state.lock().unwrap();
    if authenticated_user(&state, &headers).is_none() {
        return unauthorized();
    }
    let before = state.books.len();
    state.books.retain(|b| b.id != id);
    if state.books.len() == before {
        return (StatusCode::NOT_FOUND, "Error: Book not found").into_response();
    }
    "Book deleted successfully".into_response()
}

async fn borrow_book(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = state.lock().unwrap();
    let Some(user) = authenticated_user(&state, &headers) else {
        return unauthorized();
    };
    match state.books.iter_mut().find(|b| b.id == id) {
        Some(book) if book.available => {
            book.available = false;
            book.borrowed_by = Some(user);
            // Bare confirmation, not the updated book.
            "Book borrowed successfully".into_response()
        }
        Some(_) => (StatusCode::BAD_REQUEST, "Error: Book is not available").into_response(),
        None => (StatusCode::NOT_FOUND, "Error: Book not found").into_response(),
    }
}

async fn return_book(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = state.lock().unwrap();
    let Some(user) = authenticated_user(&state, &headers) else {
        return unauthorized();
    };
    match state.books.iter_mut().find(|b| b.id == id) {
        Some(book) if book.borrowed_by.as_deref() == Some(user.as_str()) => {
            book.available = true;
            book.borrowed_by = None;
            "Book returned successfully".into_response()
        }
        Some(_) => (StatusCode::BAD_REQUEST, "Error: Book is not borrowed by you").into_response(),
        None => (StatusCode::NOT_FOUND, "Error: Book not found").into_response(),
    }
}
