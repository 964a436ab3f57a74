use actix_session::Session;
use actix_web::{HttpResponse, http::header, web};
use askama::Template;
use chrono::Utc;

use crate::api::Envelope;
use crate::auth::session::current_user;
use crate::errors::AppError;
use crate::export::{self, NotulensiExport, PdfRenderer};
use crate::handlers::crud::{expanded, fetch, publish};
use crate::models::{Notulensi, Record, Resource, UserRole};
use crate::realtime::{ChangeHub, ChangeKind};
use crate::store::{DocumentStore, Repository};

/// POST /api/notulensi/{id}/approve
pub async fn approve(
    store: web::Data<dyn DocumentStore>,
    hub: web::Data<ChangeHub>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let store = store.get_ref();
    let user = current_user(&session, store).await?;
    if user.role == UserRole::Employee {
        return Err(AppError::Forbidden(
            "Only managers and admins can approve notulensi".to_string(),
        ));
    }
    let id = path.into_inner();

    let mut notulensi = fetch::<Notulensi>(store, &id).await?;
    if notulensi.is_approved() {
        return Err(AppError::Validation("Notulensi is already approved".to_string()));
    }
    notulensi.approve(&user.id, Utc::now());
    if !Repository::<Notulensi>::new(store).update(&notulensi).await? {
        return Err(AppError::NotFound(Notulensi::LABEL.to_string()));
    }

    log::info!("Notulensi {id} approved by {}", user.id);
    publish(&hub, ChangeKind::Update, Notulensi::COLLECTION, &id);

    let notulensi = expanded(store, notulensi).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(notulensi)))
}

/// GET /api/notulensi/{id}/export: the minutes as an A4 PDF download.
pub async fn export_pdf(
    store: web::Data<dyn DocumentStore>,
    renderer: web::Data<dyn PdfRenderer>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let graph = export::assemble(store.get_ref(), &id)
        .await
        .map_err(|e| AppError::Export(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Notulensi".to_string()))?;

    let html = NotulensiExport::build(&graph, Utc::now()).render()?;
    let pdf = renderer.render(&html).await?;

    let filename = export::export_filename(graph.meeting_title(), graph.notulensi.created_at);
    log::info!("Exported notulensi {id} as {filename} ({} bytes)", pdf.len());

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ))
        .insert_header((header::CONTENT_LENGTH, pdf.len()))
        .body(pdf))
}
