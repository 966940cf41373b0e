#![allow(dead_code)]

use axum_test::TestServer;
use std::sync::Arc;
use shortener::api::middleware::auth::{CookieSigner, ID_COOKIE, SIGN_COOKIE};
use shortener::application::services::UrlService;
use shortener::domain::repositories::UrlRepository;
use shortener::infrastructure::persistence::MemoryUrlRepository;
use shortener::routes::app_router;
use shortener::state::AppState;
use shortener::utils::code_generator::RandomShortIdGenerator;

pub const BASE_URL: &str = "http://short.test";
pub const COOKIE_SECRET: &str = "test-cookie-secret";

pub fn create_test_service(repository: Arc<dyn UrlRepository>) -> Arc<UrlService> {
    Arc::new(UrlService::with_delete_workers(
        repository,
        Arc::new(RandomShortIdGenerator::with_seed(8, 7)),
        BASE_URL,
        2,
    ))
}

pub fn create_test_state() -> (AppState, Arc<UrlService>) {
    let service = create_test_service(Arc::new(MemoryUrlRepository::new()));
    (AppState::new(service.clone(), COOKIE_SECRET), service)
}

/// Full application router over in-memory storage.
pub fn create_test_server() -> (TestServer, Arc<UrlService>) {
    let (state, service) = create_test_state();
    let server = TestServer::new(app_router(state)).unwrap();
    (server, service)
}

/// `Cookie` header value carrying a validly signed identity for `user_id`.
pub fn identity_cookie(user_id: &str) -> String {
    let signature = CookieSigner::new(COOKIE_SECRET).sign(user_id);
    format!("{ID_COOKIE}={user_id}; {SIGN_COOKIE}={signature}")
}

pub fn short_id(short_url: &str) -> &str {
    short_url
        .strip_prefix(BASE_URL)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap()
}
