//! Storage backend implementations.
//!
//! Concrete implementations of [`crate::domain::repositories::UrlRepository`].
//!
//! # Repositories
//!
//! - [`PgUrlRepository`] - PostgreSQL via SQLx
//! - [`FileUrlRepository`] - JSON file with asynchronous flushing
//! - [`MemoryUrlRepository`] - process-local map
//!
//! [`select_storage`] chooses one of them at startup.

pub mod file_url_repository;
pub mod memory_url_repository;
pub mod pg_url_repository;
pub mod selector;
mod url_table;

pub use file_url_repository::FileUrlRepository;
pub use memory_url_repository::MemoryUrlRepository;
pub use pg_url_repository::{PgPoolSettings, PgUrlRepository};
pub use selector::select_storage;
