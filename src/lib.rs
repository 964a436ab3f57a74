//! rapat: meetings, tasks and notulensi (meeting minutes) over a JSON API,
//! plus a synchronising client for the same API.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{cookie::Key, web};

pub mod api;
pub mod attendance;
pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod models;
pub mod query;
pub mod realtime;
pub mod store;
pub mod validate;

use auth::middleware::ApiKey;
use export::PdfRenderer;
use realtime::ChangeHub;
use store::SharedStore;

/// Everything the handlers pull out of `app_data`. Cloned into each worker.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub renderer: Arc<dyn PdfRenderer>,
    pub hub: ChangeHub,
    pub api_key: ApiKey,
}

impl AppState {
    pub fn new(store: SharedStore, renderer: Arc<dyn PdfRenderer>) -> Self {
        AppState {
            store,
            renderer,
            hub: ChangeHub::new(),
            api_key: ApiKey::default(),
        }
    }

    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = ApiKey(key);
        self
    }

    /// Register shared data and mount the API.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::from(self.store.clone()))
            .app_data(web::Data::from(self.renderer.clone()))
            .app_data(web::Data::new(self.hub.clone()))
            .app_data(web::Data::new(self.api_key.clone()));
        handlers::configure(cfg);
    }
}

/// Cookie session layer shared by the server and the integration tests.
pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(auth::session::SESSION_COOKIE.to_string())
        .cookie_secure(false)
        .cookie_http_only(true)
        .build()
}
