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

//! REST client for the library backend
//!
//! `client` holds the configured transport (bearer-token interceptor, 401
//! handling); `auth` and `books` are stateless endpoint wrappers on top of it.

pub mod auth;
pub mod books;
pub mod client;

// Re-export commonly used types
pub use auth::{Credentials, LoginResponse};
pub use books::{Book, BookCreateRequest, BookUpdateRequest};
pub use client::{BiblioClient, ClientConfig, ResponseBody};

/// Backend endpoint paths, relative to the configured base URL.
///
/// The base path is fixed per deployment; only the book id varies.
pub mod routes {
    pub const AUTH_LOGIN: &str = "/api/auth/login";
    pub const AUTH_REGISTER: &str = "/api/auth/register";
    pub const AUTH_LOGOUT: &str = "/api/auth/logout";

    pub const BOOKS: &str = "/api/livres";
    pub const BOOKS_BORROWED: &str = "/api/livres/emprunts";

    pub fn book(id: i64) -> String {
        format!("{BOOKS}/{id}")
    }

    pub fn book_borrow(id: i64) -> String {
        format!("{BOOKS}/{id}/emprunt")
    }

    pub fn book_return(id: i64) -> String {
        format!("{BOOKS}/{id}/retour")
    }
}
