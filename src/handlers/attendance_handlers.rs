//! Mock attendance endpoints. Nothing here is persisted.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;

use crate::api::Envelope;
use crate::attendance;
use crate::errors::AppError;
use crate::handlers::crud::{expanded, fetch};
use crate::models::{AttendanceReport, AttendanceSummary, InviteStatus, Meeting};
use crate::store::DocumentStore;

/// GET /api/meetings/{id}/attendance
pub async fn attendance(
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let store = store.get_ref();
    let meeting = fetch::<Meeting>(store, &path.into_inner()).await?;
    let meeting = expanded(store, meeting).await?;

    let records = attendance::simulate(&meeting, &mut rand::rng(), Utc::now());
    let invited = meeting
        .participants
        .iter()
        .filter(|p| p.status != InviteStatus::Declined)
        .count();
    let summary = AttendanceSummary::from_records(invited, &records);

    Ok(HttpResponse::Ok().json(Envelope::ok(AttendanceReport {
        meeting_id: meeting.id,
        records,
        summary,
    })))
}

#[derive(Debug, Deserialize)]
pub struct QrParams {
    pub size: Option<u32>,
}

/// GET /api/meetings/{id}/qr: a fresh check-in ticket as a PNG.
pub async fn qr(
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
    params: web::Query<QrParams>,
) -> Result<HttpResponse, AppError> {
    let meeting = fetch::<Meeting>(store.get_ref(), &path.into_inner()).await?;
    let size = params.size.unwrap_or(256).clamp(64, 1024);

    let ticket = attendance::issue_ticket(&meeting.id, &mut rand::rng(), Utc::now());
    let png = attendance::ticket_png(&ticket, size)
        .map_err(|e| AppError::Internal(format!("QR for meeting {}: {e}", meeting.id)))?;

    Ok(HttpResponse::Ok()
        .content_type("image/png")
        .insert_header(("Cache-Control", "no-store"))
        .insert_header(("X-Ticket-Expires", ticket.expires_at.to_rfc3339()))
        .body(png))
}
