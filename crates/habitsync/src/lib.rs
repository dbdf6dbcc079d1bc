//! Local-first persistence and migration layer for the habitsync app.
//!
//! Two pieces make up this crate:
//!
//! - [`adapter::StorageAdapter`] bridges a durable-store repository to the
//!   string-blob key-value interface the state container's persistence
//!   middleware expects, with a single-flight initialization guard and
//!   degrade-to-empty failure handling.
//! - [`migration::MigrationRunner`] moves user data from the legacy async
//!   key-value store into the durable store exactly once per installation,
//!   tolerating partial failure per category.
//!
//! Concrete backends live in [`storage`] (SQLite, in-memory) and [`kv`]
//! (in-memory, JSON file). The contracts they implement are defined in
//! `habitsync_core`.

pub mod adapter;
pub mod kv;
pub mod migration;
pub mod storage;
