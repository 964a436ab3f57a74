use std::sync::Arc;

use actix_web::{App, HttpResponse, HttpServer, middleware, web};

use rapat::api::Envelope;
use rapat::config::AppConfig;
use rapat::export::ChromiumRenderer;
use rapat::store::{DocumentStore, MemoryStore, PgStore, seed};
use rapat::{AppState, session_middleware};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env();

    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url)
                .await
                .map_err(|e| std::io::Error::other(format!("Database setup failed: {e}")))?;
            log::info!("Connected to Postgres");
            Arc::new(store)
        }
        None => {
            log::warn!("No DATABASE_URL set, keeping data in memory (lost on restart)");
            Arc::new(MemoryStore::new())
        }
    };

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        match seed::seed_admin(store.as_ref(), email, password).await {
            Ok(true) => log::info!("Created admin account {email}"),
            Ok(false) => {}
            Err(e) => log::error!("Failed to seed admin account: {e}"),
        }
    }
    if config.seed_demo {
        match seed::seed_demo(store.as_ref()).await {
            Ok(true) => log::info!("Seeded demo data"),
            Ok(false) => log::info!("Store not empty, skipping demo data"),
            Err(e) => log::error!("Failed to seed demo data: {e}"),
        }
    }

    let renderer = Arc::new(ChromiumRenderer::new(config.pdf.clone()));
    let state = AppState::new(store, renderer).with_api_key(config.api_key.clone());
    if state.api_key.0.is_some() {
        log::info!("API key required on /api requests");
    }

    let secret_key = config.session_key();
    let bind_addr = config.bind_addr.clone();

    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(session_middleware(secret_key.clone()))
            .wrap(middleware::Logger::default())
            .configure(|cfg| state.configure(cfg))
            .default_service(web::to(|| async {
                HttpResponse::NotFound().json(Envelope::error("Not found"))
            }))
    })
    .bind(bind_addr)?
    .run()
    .await
}
