//! REST API layer for HTTP request/response handling.
//!
//! This layer translates HTTP requests into service calls and chooses status
//! codes. The service itself never sees HTTP types.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Cookie identity and tracing middleware
//! - [`routes`] - Route configuration and composition

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
