//! Core contracts for the habitsync persistence layer.
//!
//! This crate defines the domain types, repository traits, and codecs shared
//! by every storage backend. It performs no I/O itself: concrete backends
//! (SQLite, in-memory) live in the `habitsync` crate and implement the traits
//! declared here.

pub mod envelope;
pub mod habits;
pub mod kv;
pub mod storage;
