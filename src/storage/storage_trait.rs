//! Session Store Trait
//!
//! This module defines the `SessionStore` trait, the only interface the web
//! layer uses to reach persisted sessions.
//!
//! Implementors are responsible for:
//! - Assigning store-unique IDs on insertion
//! - Returning lists ordered by title
//! - Rejecting updates and deletes of unassigned or unknown IDs
//!
//! All methods return a `Result` to handle potential storage errors.

use async_trait::async_trait;

use crate::error_handling::types::StorageError;
use crate::storage::types::Session;

/// The `SessionStore` trait defines the interface for session storage backends.
///
/// Both backends are interchangeable: the choice is made once at start-up and
/// the result is shared as an `Arc<dyn SessionStore>`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns every session, ordered by title.
    async fn list_sessions(&self) -> Result<Vec<Session>, StorageError>;

    /// Returns the sessions created by `user_id`, ordered by title.
    ///
    /// An empty `user_id` behaves like [`SessionStore::list_sessions`].
    async fn list_sessions_created_by(&self, user_id: &str)
        -> Result<Vec<Session>, StorageError>;

    /// Retrieves a session by its ID.
    async fn get_session(&self, id: i64) -> Result<Session, StorageError>;

    /// Saves a session, assigning it a new ID. Any ID already set on
    /// `session` is ignored.
    async fn add_session(&self, session: &Session) -> Result<i64, StorageError>;

    /// Replaces the stored session with the same ID.
    async fn update_session(&self, session: &Session) -> Result<(), StorageError>;

    /// Removes a session by its ID.
    async fn delete_session(&self, id: i64) -> Result<(), StorageError>;

    /// Frees any resources held by the store. Calling it twice is harmless.
    async fn close(&self);
}
