//! # Message Board Core Types
//!
//! The data model shared by every other crate in the workspace: the stored
//! `Message`, the validated `NewMessage` that is the only way to create one,
//! the raw `CreateMessageRequest` as it arrives over HTTP, and the read-only
//! `CatalogItem`.

pub mod error;
pub mod requests;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use requests::CreateMessageRequest;
pub use structs::{CatalogItem, Message, NewMessage};
