//! Application layer services implementing business logic.
//!
//! Services consume the [`crate::domain::repositories::UrlRepository`] trait and
//! provide a backend-agnostic API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::UrlService`] - Shortening, listing, resolution and deletion
//! - [`services::DeletePipeline`] - Bounded background deletion workers
//! - [`services::UserUrlCache`] - Per-user listing cache

pub mod services;
