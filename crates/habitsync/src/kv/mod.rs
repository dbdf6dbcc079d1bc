//! Key-value store backends for the legacy persistence substrate.
//!
//! On a device the legacy store is the platform's async key-value storage;
//! here it is represented by two implementations of
//! `habitsync_core::kv::KeyValueStore`: an in-memory store for tests and a
//! JSON-file store for running the migration against an exported dump.

mod file;
mod memory;

pub use file::FileKvStore;
pub use memory::MemoryKvStore;
