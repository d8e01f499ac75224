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

//! Persisted session token
//!
//! Exactly one opaque token string is stored per device install, under a
//! fixed storage key. Reads and writes are scoped and best-effort; they are
//! not transactional with the in-memory session flag.

use crate::error::Result;
use crate::storage::Database;
use sqlx::SqlitePool;

/// Fixed storage key for the session token
const TOKEN_KEY: &str = "session_token";

/// Device-local store for the session token
#[derive(Debug, Clone)]
pub struct TokenStore {
    pool: SqlitePool,
}

impl TokenStore {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Persist the token, replacing any previous one
    pub async fn save(&self, token: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO Session (storage_key, token)
            VALUES (?, ?)
            ON CONFLICT(storage_key) DO UPDATE SET
                token = excluded.token,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(TOKEN_KEY)
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Load the persisted token, if any
    pub async fn load(&self) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT token FROM Session WHERE storage_key = ?")
                .bind(TOKEN_KEY)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(token,)| token))
    }

    /// Remove the persisted token
    ///
    /// Clearing an already absent token is a no-op.
    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM Session WHERE storage_key = ?")
            .bind(TOKEN_KEY)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> TokenStore {
        let db = Database::in_memory().await.unwrap();
        TokenStore::new(&db)
    }

    #[tokio::test]
    async fn test_save_and_load_token() {
        let store = store().await;
        assert_eq!(store.load().await.unwrap(), None);

        store.save("abc123").await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some("abc123".to_string()));
    }

    #[tokio::test]
    async fn test_save_replaces_previous_token() {
        let store = store().await;
        store.save("first").await.unwrap();
        store.save("second").await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some("second".to_string()));
    }

    #[tokio::test]
    async fn test_clear_token() {
        let store = store().await;
        store.save("abc123").await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);

        // Clearing again is a no-op.
        store.clear().await.unwrap();
    }
}
