//! # Message Board Database Crate
//!
//! This crate is the only place that knows SQL. The rest of the workspace
//! talks to the store through the [`MessageStore`] trait, so the HTTP layer
//! can be driven by Postgres in production and by [`InMemoryStore`] in tests.
//!
//! ## Public API
//!
//! - `connect`: builds the bounded, lazily-connecting Postgres pool.
//! - `PgRepository`: the Postgres implementation of `MessageStore`.
//! - `InMemoryStore`: a process-local implementation with failure injection.
//! - `schema::initialize`: creates and seeds the `messages` table, retrying
//!   under a `RetryPolicy` while the database comes up.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod repository;
pub mod schema;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, connect_options};
pub use error::DbError;
pub use memory::InMemoryStore;
pub use repository::{MessageStore, PgRepository};
pub use schema::{initialize, seed_if_empty, InitReport, RetryPolicy};
