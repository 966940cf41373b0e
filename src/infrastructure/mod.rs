//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL, file and in-memory storage backends plus
//!   the startup selector choosing between them

pub mod persistence;
