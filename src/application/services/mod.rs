//! Business logic services for the application layer.

pub mod delete_pipeline;
pub mod url_service;
pub mod user_url_cache;

pub use delete_pipeline::{DeleteJob, DeletePipeline, DeleteReport};
pub use url_service::UrlService;
pub use user_url_cache::UserUrlCache;
