//! Shared application state injected into all handlers.

use std::sync::Arc;

use crate::api::middleware::auth::CookieSigner;
use crate::application::services::UrlService;

/// Application state cloned into every request.
///
/// The service is constructed once at startup and shared by handle; it owns
/// the per-user cache and the delete workers.
#[derive(Clone)]
pub struct AppState {
    pub url_service: Arc<UrlService>,
    pub cookie_signer: Arc<CookieSigner>,
}

impl AppState {
    pub fn new(url_service: Arc<UrlService>, cookie_secret: &str) -> Self {
        Self {
            url_service,
            cookie_signer: Arc::new(CookieSigner::new(cookie_secret)),
        }
    }
}
