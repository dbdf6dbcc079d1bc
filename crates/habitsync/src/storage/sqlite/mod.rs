//! SQLite storage backend implementation.
//!
//! Implements the repository traits from `habitsync_core::storage` using
//! `rusqlite` for synchronous operations and `tokio-rusqlite` for async
//! wrapping. Opening a connection and creating the schema are separate
//! steps: `SqliteRepository::open` only opens the file, and the schema is
//! created by the `DatabaseInitializer` implementation, so the storage
//! adapter's lazy-initialization guard controls when setup actually runs.

mod conversions;
mod error;
mod repository;
mod schema;

pub use repository::SqliteRepository;
