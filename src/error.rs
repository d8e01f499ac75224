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

//! Error types for biblio-core
//!
//! Errors are categorized by domain (transport, authorization, validation,
//! input, storage) using thiserror. Services validate and fail; the state
//! stores catch, record a display message and keep their previous data.

use thiserror::Error;

/// Result type alias using our BiblioError type
pub type Result<T> = std::result::Result<T, BiblioError>;

/// Main error type for biblio-core
#[derive(Error, Debug)]
pub enum BiblioError {
    // ===== API Errors =====

    /// Authentication with the backend failed (bad credentials, expired session)
    #[error("authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The backend answered 401; the stored session token has been cleared
    #[error("unauthorized{}", endpoint.as_deref().map(|e| format!(" ({e})")).unwrap_or_default())]
    Unauthorized { endpoint: Option<String> },

    /// Generic API request failure (non-2xx status)
    #[error("API request failed: {message}")]
    ApiRequestFailed {
        message: String,
        /// HTTP status code if available
        status_code: Option<u16>,
        /// API endpoint that failed
        endpoint: Option<String>,
    },

    /// API returned a response whose shape fails validation
    #[error("{message}")]
    InvalidApiResponse {
        message: String,
        /// Response body snippet for debugging
        response_body: Option<String>,
    },

    /// Network connectivity error (DNS failure, refused connection, timeout)
    #[error("network error: {0}")]
    NetworkError(String),

    // ===== Input Errors =====

    /// Required field is missing or empty
    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    /// Generic input validation error
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // ===== Storage Errors =====

    /// Generic storage failure (token store, database file)
    #[error("storage error: {0}")]
    StorageError(String),

    // ===== General Errors =====

    /// Internal error that should not normally occur
    #[error("internal error: {0}")]
    InternalError(String),

    // ===== External Library Errors =====

    /// HTTP client error from reqwest
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Database driver error from sqlx
    #[error("database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// Helper methods for creating common errors
impl BiblioError {
    /// Create an AuthenticationFailed error
    pub fn auth_failed<S: Into<String>>(message: S) -> Self {
        BiblioError::AuthenticationFailed {
            message: message.into(),
        }
    }

    /// Create an ApiRequestFailed error
    pub fn api_failed<S: Into<String>>(
        message: S,
        status_code: Option<u16>,
        endpoint: Option<String>,
    ) -> Self {
        BiblioError::ApiRequestFailed {
            message: message.into(),
            status_code,
            endpoint,
        }
    }

    /// Create an InvalidApiResponse error
    pub fn invalid_response<S: Into<String>>(message: S, response_body: Option<String>) -> Self {
        BiblioError::InvalidApiResponse {
            message: message.into(),
            response_body,
        }
    }

    /// Create an InvalidInput error with a message
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        BiblioError::InvalidInput(message.into())
    }

    /// Create an InternalError with a message
    pub fn internal<S: Into<String>>(message: S) -> Self {
        BiblioError::InternalError(message.into())
    }

    /// Check if error is due to authentication/authorization
    ///
    /// Returns `true` for errors that indicate the user needs to log in again.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            BiblioError::AuthenticationFailed { .. } | BiblioError::Unauthorized { .. }
        )
    }

    /// Get user-friendly error message suitable for display
    ///
    /// Technical details are omitted where they would not help the user.
    pub fn user_message(&self) -> String {
        match self {
            BiblioError::Unauthorized { .. } => {
                "Your session has expired. Please log in again.".to_string()
            }
            BiblioError::AuthenticationFailed { message } => {
                format!("Authentication failed: {message}. Please check your credentials and try again.")
            }
            BiblioError::NetworkError(_) | BiblioError::ReqwestError(_) => {
                "Could not reach the library server. Please check your connection.".to_string()
            }
            BiblioError::InvalidApiResponse { message, .. } => message.clone(),
            _ => self.to_string(),
        }
    }
}
