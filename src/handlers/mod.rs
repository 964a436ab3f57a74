pub mod attendance_handlers;
pub mod auth_handlers;
pub mod crud;
pub mod dashboard;
pub mod notulensi_handlers;
pub mod realtime_handlers;
pub mod user_handlers;

use actix_web::{HttpRequest, error, middleware::from_fn, web};

use crate::auth::middleware::{require_api_key, require_auth, require_json_content_type};
use crate::errors::AppError;
use crate::models::{Meeting, Notulensi, Task, User};

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(format!("Invalid request body: {err}")).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(format!("Invalid query string: {err}")).into()
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(format!("Invalid path: {err}")).into()
}

/// Mount the REST API under `/api`.
///
/// `/api/auth/*` is reachable without a session; everything else requires
/// one. Mutations must be JSON, and a configured API key is checked first.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .app_data(web::QueryConfig::default().error_handler(query_error))
            .app_data(web::PathConfig::default().error_handler(path_error))
            .wrap(from_fn(require_json_content_type))
            .wrap(from_fn(require_api_key))
            .service(
                web::scope("/auth")
                    .route("/login", web::post().to(auth_handlers::login))
                    .route("/logout", web::post().to(auth_handlers::logout))
                    .route("/me", web::get().to(auth_handlers::me)),
            )
            .service(
                web::scope("")
                    .wrap(from_fn(require_auth))
                    .route("/dashboard", web::get().to(dashboard::index))
                    .route("/realtime", web::get().to(realtime_handlers::ws_connect))
                    // Meetings
                    .route("/meetings", web::get().to(crud::list::<Meeting>))
                    .route("/meetings", web::post().to(crud::create::<Meeting>))
                    .route("/meetings/{id}", web::get().to(crud::read::<Meeting>))
                    .route("/meetings/{id}", web::put().to(crud::update::<Meeting>))
                    .route("/meetings/{id}", web::delete().to(crud::delete::<Meeting>))
                    .route(
                        "/meetings/{id}/attendance",
                        web::get().to(attendance_handlers::attendance),
                    )
                    .route("/meetings/{id}/qr", web::get().to(attendance_handlers::qr))
                    // Notulensi
                    .route("/notulensi", web::get().to(crud::list::<Notulensi>))
                    .route("/notulensi", web::post().to(crud::create::<Notulensi>))
                    .route("/notulensi/{id}", web::get().to(crud::read::<Notulensi>))
                    .route("/notulensi/{id}", web::put().to(crud::update::<Notulensi>))
                    .route("/notulensi/{id}", web::delete().to(crud::delete::<Notulensi>))
                    .route(
                        "/notulensi/{id}/approve",
                        web::post().to(notulensi_handlers::approve),
                    )
                    .route(
                        "/notulensi/{id}/export",
                        web::get().to(notulensi_handlers::export_pdf),
                    )
                    // Tasks
                    .route("/tasks", web::get().to(crud::list::<Task>))
                    .route("/tasks", web::post().to(crud::create::<Task>))
                    .route("/tasks/{id}", web::get().to(crud::read::<Task>))
                    .route("/tasks/{id}", web::put().to(crud::update::<Task>))
                    .route("/tasks/{id}", web::delete().to(crud::delete::<Task>))
                    // Users: writes keep the credential in step
                    .route("/users", web::get().to(crud::list::<User>))
                    .route("/users", web::post().to(user_handlers::create))
                    .route("/users/{id}", web::get().to(crud::read::<User>))
                    .route("/users/{id}", web::put().to(user_handlers::update))
                    .route("/users/{id}", web::delete().to(user_handlers::delete)),
            ),
    );
}
