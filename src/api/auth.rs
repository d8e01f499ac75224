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

//! Auth endpoints: login, register, logout
//!
//! Stateless wrappers over `BiblioClient`. Session bookkeeping (persisting
//! the token, activation/deactivation) lives in `state::session`; these
//! functions only perform the HTTP calls and shape the responses.
//!
//! The backend answers login with `{"token": "..."}` and register/logout
//! with a plain-text confirmation, so only login is parsed as JSON.

use crate::api::client::BiblioClient;
use crate::api::routes;
use crate::error::Result;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Login/register request body
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new<S: Into<String>>(username: S, password: S) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Successful login response carrying the opaque session token
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

impl BiblioClient {
    /// Authenticate and obtain a session token
    ///
    /// # Errors
    /// Bad credentials surface as `Unauthorized` (the backend answers 401);
    /// a malformed response body as `InvalidApiResponse`.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        self.request_json(Method::POST, routes::AUTH_LOGIN, Some(credentials))
            .await
    }

    /// Create a new account
    ///
    /// Does not establish a session; the caller must log in separately.
    pub async fn register(&self, credentials: &Credentials) -> Result<()> {
        self.request_empty(Method::POST, routes::AUTH_REGISTER, Some(credentials))
            .await
    }

    /// Invalidate the session on the backend
    ///
    /// The caller decides how to treat failures; the session store treats
    /// this call as best-effort and clears local state regardless.
    pub async fn logout(&self) -> Result<()> {
        self.request_empty(Method::POST, routes::AUTH_LOGOUT, None::<&()>)
            .await
    }
}
