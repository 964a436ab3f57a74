//! Shared test infrastructure for the HTTP API tests.
//!
//! - `TestApp::new()` - in-memory store with the admin account and demo data
//! - `login()` - session cookie for a seeded account
//! - `FakeRenderer` - PDF renderer that never launches a browser
//! - `VanishingStore` - store whose records disappear before updates land

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_http::Request;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, Error, test};
use async_trait::async_trait;
use serde_json::{Value, json};

use rapat::auth::session::SESSION_COOKIE;
use rapat::export::{PdfRenderer, RenderError};
use rapat::store::{DocumentStore, MemoryStore, SharedStore, StoreError, seed};
use rapat::{AppState, session_middleware};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const ADMIN_EMAIL: &str = "admin@contoh.id";
pub const ADMIN_PASS: &str = "admin12345";
/// Demo manager (user-1).
pub const MANAGER_EMAIL: &str = "budi@contoh.id";
/// Demo employee (user-2).
pub const EMPLOYEE_EMAIL: &str = "siti@contoh.id";
pub const DEMO_PASS: &str = seed::DEMO_PASSWORD;

pub const FAKE_PDF: &[u8] = b"%PDF-1.4\n% test document\n%%EOF\n";

// ============================================================================
// RENDERERS
// ============================================================================

/// Returns [`FAKE_PDF`] and remembers the last HTML it was given.
#[derive(Default)]
pub struct FakeRenderer {
    pub calls: AtomicUsize,
    pub last_html: std::sync::Mutex<Option<String>>,
}

#[async_trait]
impl PdfRenderer for FakeRenderer {
    async fn render(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_html.lock().expect("renderer lock") = Some(html.to_string());
        Ok(FAKE_PDF.to_vec())
    }
}

/// Always fails like a browser that crashed.
pub struct BrokenRenderer;

#[async_trait]
impl PdfRenderer for BrokenRenderer {
    async fn render(&self, _html: &str) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::Failed("chromium exited with status 1".into()))
    }
}

// ============================================================================
// STORES
// ============================================================================

/// Delegates to a [`MemoryStore`], except that every replace finds the
/// record already gone, as if it was deleted between read and write.
pub struct VanishingStore(pub Arc<MemoryStore>);

#[async_trait]
impl DocumentStore for VanishingStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        self.0.get(collection, id).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        self.0.list(collection).await
    }

    async fn insert(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        self.0.insert(collection, id, doc).await
    }

    async fn replace(&self, collection: &str, id: &str, _doc: Value) -> Result<bool, StoreError> {
        self.0.delete(collection, id).await?;
        Ok(false)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        self.0.delete(collection, id).await
    }
}

// ============================================================================
// APP SETUP
// ============================================================================

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub renderer: Arc<FakeRenderer>,
    pub state: AppState,
}

impl TestApp {
    /// Admin account plus the demo organisation.
    pub async fn new() -> Self {
        let renderer = Arc::new(FakeRenderer::default());
        Self::build(renderer.clone(), renderer).await
    }

    /// Same data, but every PDF conversion fails.
    pub async fn with_broken_renderer() -> Self {
        Self::build(Arc::new(FakeRenderer::default()), Arc::new(BrokenRenderer)).await
    }

    /// Same data, but records vanish before any update is written.
    pub async fn with_vanishing_updates() -> Self {
        let mut ctx = Self::new().await;
        let store: SharedStore = Arc::new(VanishingStore(ctx.store.clone()));
        ctx.state = AppState::new(store, ctx.state.renderer.clone());
        ctx
    }

    async fn build(fake: Arc<FakeRenderer>, renderer: Arc<dyn PdfRenderer>) -> Self {
        let store = Arc::new(MemoryStore::new());
        seed::seed_admin(store.as_ref(), ADMIN_EMAIL, ADMIN_PASS)
            .await
            .expect("Failed to seed admin");
        seed::seed_demo(store.as_ref())
            .await
            .expect("Failed to seed demo data");
        let state = AppState::new(store.clone(), renderer);
        TestApp {
            store,
            renderer: fake,
            state,
        }
    }

    pub async fn service(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse, Error = Error> {
        let state = self.state.clone();
        test::init_service(
            App::new()
                .wrap(session_middleware(Key::generate()))
                .configure(|cfg| state.configure(cfg)),
        )
        .await
    }
}

// ============================================================================
// REQUEST HELPERS
// ============================================================================

/// Log in and return the session cookie.
pub async fn login<S>(app: &S, email: &str, password: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert!(resp.status().is_success(), "login as {email} failed: {}", resp.status());
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
        .expect("login sets the session cookie")
}

pub async fn get_json<S>(app: &S, uri: &str, cookie: &Cookie<'static>) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    let req = test::TestRequest::get()
        .uri(uri)
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    (status, test::read_body_json(resp).await)
}

pub async fn send_json<S>(
    app: &S,
    req: test::TestRequest,
    cookie: &Cookie<'static>,
    body: Value,
) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    let req = req.cookie(cookie.clone()).set_json(body).to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    (status, test::read_body_json(resp).await)
}
