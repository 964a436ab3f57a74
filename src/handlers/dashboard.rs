use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::Utc;

use crate::api::Envelope;
use crate::auth::session::require_user_id;
use crate::errors::AppError;
use crate::models::{Meeting, Notulensi, Task, dashboard};
use crate::store::{DocumentStore, Repository};

/// GET /api/dashboard
pub async fn index(
    store: web::Data<dyn DocumentStore>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let user_id = require_user_id(&session)?;
    let store = store.get_ref();

    let meetings = Repository::<Meeting>::new(store).list().await?;
    let tasks = Repository::<Task>::new(store).list().await?;
    let notulensi = Repository::<Notulensi>::new(store).list().await?;

    let stats = dashboard::summarize(&meetings, &tasks, &notulensi, &user_id, Utc::now());
    Ok(HttpResponse::Ok().json(Envelope::ok(stats)))
}
