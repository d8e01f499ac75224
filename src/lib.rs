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

//! Biblio client core
//!
//! The portable core of the Biblio library client: HTTP transport with
//! bearer-token handling, auth and book endpoints, session lifecycle,
//! in-memory book collections and on-device token persistence. Host
//! frontends drive it through [`app::BiblioApp`]; the bundled CLI is a
//! desktop harness over the same surface.

pub mod api;
pub mod app;
pub mod error;
pub mod state;
pub mod storage;

pub use api::client::{BiblioClient, ClientConfig};
pub use app::BiblioApp;
pub use error::{BiblioError, Result};
pub use state::{BookStore, SessionManager, SessionState};
pub use storage::Database;
