//! Repository trait definitions for the domain layer.
//!
//! [`UrlRepository`] abstracts the storage backend so the service runs
//! unmodified over any implementation in `crate::infrastructure::persistence`.
//! A mock implementation is generated via `mockall` for unit tests.

pub mod url_repository;

pub use url_repository::UrlRepository;

#[cfg(test)]
pub use url_repository::MockUrlRepository;
