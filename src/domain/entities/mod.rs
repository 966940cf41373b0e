//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures shared by the service layer and every
//! storage backend.
//!
//! # Entity Types
//!
//! - [`UrlRecord`] - A stored short ID to URL mapping, possibly soft-deleted
//! - [`ShortenResult`] - Outcome of shortening one URL
//! - [`UserUrl`] - A live URL as listed to its owner
//! - [`BatchItem`] / [`BatchResult`] - Batch shortening input and output

pub mod url;

pub use url::{BatchItem, BatchResult, ShortenResult, UrlRecord, UserUrl};
