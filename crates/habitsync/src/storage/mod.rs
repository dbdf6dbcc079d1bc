//! Storage backend implementations.
//!
//! Concrete implementations of the repository traits defined in
//! `habitsync_core::storage`. Backends are selected via feature flags:
//!
//! - `sqlite` (default): durable SQLite backend using `rusqlite` and
//!   `tokio-rusqlite`
//! - `inmemory`: HashMap-backed backend for tests and prototyping
//!
//! Unlike the backends, the adapter and migration runner only ever see
//! `Arc<dyn Trait>` handles, so both backends can coexist in one build.

#[cfg(not(any(test, feature = "sqlite", feature = "inmemory")))]
compile_error!(
    "No storage backend selected. Enable 'sqlite' or 'inmemory'. \
    Example: cargo build -p habitsync --features sqlite"
);

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(test, feature = "inmemory"))]
pub mod inmemory;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;

#[cfg(any(test, feature = "inmemory"))]
pub use inmemory::InMemoryRepository;
