//! Storage subsystem
//!
//! This module provides the session store contract and its implementations.
//!
//! Components:
//! - `storage_trait`: the `SessionStore` trait defining a uniform async API.
//! - `types`: the `Session` record and the list filter.
//! - `memory_storage`: mutex-guarded in-process implementation.
//! - `database_storage`: SeaORM-backed durable implementation.
//! - `session_filter`: helpers to build list filters.
//! - `db_entities`: SeaORM entity model for the database backend.

pub mod database_storage;
pub mod db_entities;
pub mod memory_storage;
pub mod session_filter;
pub mod storage_trait;
pub mod types;


pub use database_storage::DatabaseStorage;
pub use memory_storage::MemoryStorage;
pub use storage_trait::SessionStore;
pub use types::{Session, SessionFilter, ANONYMOUS_CREATOR_ID};
