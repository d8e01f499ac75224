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

//! Book endpoints and response-shape validation
//!
//! Every operation performs exactly one HTTP call and validates the response
//! shape before returning it: a valid book JSON value has a numeric `id`, a
//! string `title`, a string `author` and a boolean `available`. Anything
//! else is an error, never data.
//!
//! The borrow/return endpoints may answer with a bare confirmation string
//! instead of the updated book; in that case a follow-up get-by-id fetches
//! the canonical object before validation.

use crate::api::client::{BiblioClient, ResponseBody};
use crate::api::routes;
use crate::error::{BiblioError, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Message used for every response-shape validation failure
const INVALID_BOOK: &str = "invalid book data received";

/// A catalog book as exposed by the backend
///
/// `id` is server-assigned and immutable. The borrow fields are opaque
/// strings set by the server; the client never interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrowed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrowed_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
}

/// Request body for creating a book
#[derive(Debug, Clone, Serialize)]
pub struct BookCreateRequest {
    pub title: String,
    pub author: String,
    pub description: String,
}

/// Request body for updating a book
///
/// No partial-update semantics: the complete triple is always resent.
#[derive(Debug, Clone, Serialize)]
pub struct BookUpdateRequest {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
}

impl BookCreateRequest {
    /// Guard against empty fields before any network call is made
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.title, &self.author, &self.description)
    }
}

impl BookUpdateRequest {
    /// Guard against empty fields and a missing id before any network call
    pub fn validate(&self) -> Result<()> {
        if self.id <= 0 {
            return Err(BiblioError::MissingRequiredField("id".to_string()));
        }
        validate_fields(&self.title, &self.author, &self.description)
    }
}

fn validate_fields(title: &str, author: &str, description: &str) -> Result<()> {
    for (field, value) in [
        ("title", title),
        ("author", author),
        ("description", description),
    ] {
        if value.trim().is_empty() {
            return Err(BiblioError::MissingRequiredField(field.to_string()));
        }
    }
    Ok(())
}

/// Check that a JSON value has the shape of a book
///
/// Required: numeric `id`, string `title`, string `author`, boolean
/// `available`. Extra fields are allowed.
pub fn is_valid_book(value: &Value) -> bool {
    value.get("id").map(Value::is_i64).unwrap_or(false)
        && value.get("title").map(Value::is_string).unwrap_or(false)
        && value.get("author").map(Value::is_string).unwrap_or(false)
        && value.get("available").map(Value::is_boolean).unwrap_or(false)
}

/// Validate a JSON value and convert it into a `Book`
fn book_from_value(value: Value) -> Result<Book> {
    if !is_valid_book(&value) {
        return Err(BiblioError::invalid_response(
            INVALID_BOOK,
            Some(value.to_string()),
        ));
    }
    serde_json::from_value(value)
        .map_err(|e| BiblioError::invalid_response(format!("{INVALID_BOOK}: {e}"), None))
}

/// Validate a JSON array and convert it into a book list
fn books_from_value(value: Value) -> Result<Vec<Book>> {
    match value {
        Value::Array(items) => {
            if !items.iter().all(is_valid_book) {
                return Err(BiblioError::invalid_response(INVALID_BOOK, None));
            }
            items.into_iter().map(book_from_value).collect()
        }
        other => Err(BiblioError::invalid_response(
            INVALID_BOOK,
            Some(other.to_string()),
        )),
    }
}

impl BiblioClient {
    /// List all available books
    pub async fn list_books(&self) -> Result<Vec<Book>> {
        let body = self
            .request_body(Method::GET, routes::BOOKS, None::<&()>)
            .await?;
        match body {
            ResponseBody::Json(value) => books_from_value(value),
            ResponseBody::Text(text) => Err(BiblioError::invalid_response(INVALID_BOOK, Some(text))),
        }
    }

    /// List books currently borrowed by the logged-in user
    pub async fn list_borrowed_books(&self) -> Result<Vec<Book>> {
        let body = self
            .request_body(Method::GET, routes::BOOKS_BORROWED, None::<&()>)
            .await?;
        match body {
            ResponseBody::Json(value) => books_from_value(value),
            ResponseBody::Text(text) => Err(BiblioError::invalid_response(INVALID_BOOK, Some(text))),
        }
    }

    /// Fetch one book by id
    pub async fn get_book(&self, id: i64) -> Result<Book> {
        let body = self
            .request_body(Method::GET, &routes::book(id), None::<&()>)
            .await?;
        self.expect_book(body, id).await
    }

    /// Create a new book
    pub async fn create_book(&self, book: &BookCreateRequest) -> Result<Book> {
        book.validate()?;
        let body = self
            .request_body(Method::POST, routes::BOOKS, Some(book))
            .await?;
        match body {
            ResponseBody::Json(value) => book_from_value(value),
            ResponseBody::Text(text) => Err(BiblioError::invalid_response(INVALID_BOOK, Some(text))),
        }
    }

    /// Update an existing book, resending the complete triple
    pub async fn update_book(&self, book: &BookUpdateRequest) -> Result<Book> {
        book.validate()?;
        let body = self
            .request_body(Method::PUT, &routes::book(book.id), Some(book))
            .await?;
        match body {
            ResponseBody::Json(value) => book_from_value(value),
            ResponseBody::Text(text) => Err(BiblioError::invalid_response(INVALID_BOOK, Some(text))),
        }
    }

    /// Delete a book by id
    pub async fn delete_book(&self, id: i64) -> Result<()> {
        self.request_empty(Method::DELETE, &routes::book(id), None::<&()>)
            .await
    }

    /// Borrow a book, returning the canonical updated book object
    pub async fn borrow_book(&self, id: i64) -> Result<Book> {
        let body = self
            .request_body(Method::POST, &routes::book_borrow(id), None::<&()>)
            .await?;
        self.expect_book(body, id).await
    }

    /// Return a borrowed book, returning the canonical updated book object
    pub async fn return_book(&self, id: i64) -> Result<Book> {
        let body = self
            .request_body(Method::POST, &routes::book_return(id), None::<&()>)
            .await?;
        self.expect_book(body, id).await
    }

    /// Resolve a response into a validated book
    ///
    /// A bare confirmation string triggers a follow-up get-by-id, since the
    /// borrow/return endpoints do not always echo the updated object.
    async fn expect_book(&self, body: ResponseBody, id: i64) -> Result<Book> {
        match body {
            ResponseBody::Json(Value::String(confirmation)) | ResponseBody::Text(confirmation) => {
                debug!(id, %confirmation, "endpoint answered with confirmation, refetching book");
                let value = self
                    .request_body(Method::GET, &routes::book(id), None::<&()>)
                    .await?;
                match value {
                    ResponseBody::Json(value) => book_from_value(value),
                    ResponseBody::Text(text) => {
                        Err(BiblioError::invalid_response(INVALID_BOOK, Some(text)))
                    }
                }
            }
            ResponseBody::Json(value) => book_from_value(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dune(available: bool) -> Value {
        json!({
            "id": 1,
            "title": "Dune",
            "author": "Herbert",
            "description": "Spice",
            "available": available,
        })
    }

    #[test]
    fn test_is_valid_book_accepts_complete_payload() {
        assert!(is_valid_book(&dune(true)));
    }

    #[test]
    fn test_is_valid_book_rejects_missing_fields() {
        for field in ["id", "title", "author", "available"] {
            let mut value = dune(true);
            value.as_object_mut().unwrap().remove(field);
            assert!(!is_valid_book(&value), "payload without {field} passed");
        }
    }

    #[test]
    fn test_is_valid_book_rejects_wrong_types() {
        let mut value = dune(true);
        value["id"] = json!("1");
        assert!(!is_valid_book(&value));

        let mut value = dune(true);
        value["available"] = json!("yes");
        assert!(!is_valid_book(&value));
    }

    #[test]
    fn test_book_from_value_round_trips_valid_payload() {
        let book = book_from_value(dune(false)).unwrap();
        assert_eq!(book.id, 1);
        assert_eq!(book.title, "Dune");
        assert_eq!(book.available, Some(false));
        assert!(book.borrowed_by.is_none());
    }

    #[test]
    fn test_books_from_value_rejects_one_bad_entry() {
        let value = json!([dune(true), {"id": 2, "title": "Broken"}]);
        let err = books_from_value(value).unwrap_err();
        assert!(matches!(err, BiblioError::InvalidApiResponse { .. }));
    }

    #[test]
    fn test_books_from_value_rejects_non_array() {
        let err = books_from_value(dune(true)).unwrap_err();
        assert!(matches!(err, BiblioError::InvalidApiResponse { .. }));
    }

    #[test]
    fn test_book_wire_names_are_camel_case() {
        let book = Book {
            id: 3,
            title: "Emma".to_string(),
            author: "Austen".to_string(),
            description: String::new(),
            available: Some(false),
            borrowed_by: Some("alice".to_string()),
            borrowed_date: Some("2025-06-01".to_string()),
            return_date: None,
        };
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["borrowedBy"], "alice");
        assert_eq!(json["borrowedDate"], "2025-06-01");
        assert!(json.get("returnDate").is_none());
    }

    #[test]
    fn test_create_request_rejects_empty_title() {
        let request = BookCreateRequest {
            title: "  ".to_string(),
            author: "Austen".to_string(),
            description: "A novel".to_string(),
        };
        let err = request.validate().unwrap_err();
        assert!(matches!(err, BiblioError::MissingRequiredField(f) if f == "title"));
    }

    #[test]
    fn test_update_request_rejects_missing_id() {
        let request = BookUpdateRequest {
            id: 0,
            title: "Emma".to_string(),
            author: "Austen".to_string(),
            description: "A novel".to_string(),
        };
        let err = request.validate().unwrap_err();
        assert!(matches!(err, BiblioError::MissingRequiredField(f) if f == "id"));
    }

    #[test]
    fn test_valid_requests_pass_validation() {
        let create = BookCreateRequest {
            title: "Emma".to_string(),
            author: "Austen".to_string(),
            description: "A novel".to_string(),
        };
        assert!(create.validate().is_ok());

        let update = BookUpdateRequest {
            id: 9,
            title: "Emma".to_string(),
            author: "Austen".to_string(),
            description: "A novel".to_string(),
        };
        assert!(update.validate().is_ok());
    }
}
