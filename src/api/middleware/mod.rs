//! HTTP middleware for request processing.
//!
//! Provides cookie identity and request tracing.

pub mod auth;
pub mod tracing;
