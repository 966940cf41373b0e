//! Utility functions shared across layers.
//!
//! - [`code_generator`] - Random short ID generation
//! - [`url_validator`] - Checks for submitted URLs

pub mod code_generator;
pub mod url_validator;
