//! User writes also maintain the login credential, so they do not go through
//! the generic CRUD handlers.

use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::Utc;

use crate::api::{Deleted, Envelope};
use crate::auth::password;
use crate::auth::session::require_admin;
use crate::errors::AppError;
use crate::handlers::crud::{ensure_unreferenced, fetch, publish};
use crate::models::{Credential, Record, Resource, User, UserDraft, UserPatch, new_id};
use crate::realtime::{ChangeHub, ChangeKind};
use crate::store::{DocumentStore, Repository};
use crate::validate;

async fn ensure_email_free(
    store: &dyn DocumentStore,
    email: &str,
    except_id: Option<&str>,
) -> Result<(), AppError> {
    let email = email.trim().to_lowercase();
    let taken = Repository::<User>::new(store)
        .list()
        .await?
        .iter()
        .any(|u| u.email == email && Some(u.id.as_str()) != except_id);
    if taken {
        return Err(AppError::Validation("Email is already in use".to_string()));
    }
    Ok(())
}

/// POST /api/users
pub async fn create(
    store: web::Data<dyn DocumentStore>,
    hub: web::Data<ChangeHub>,
    session: Session,
    body: web::Json<UserDraft>,
) -> Result<HttpResponse, AppError> {
    let store = store.get_ref();
    let admin = require_admin(&session, store).await?;
    let mut draft = body.into_inner();

    let password = draft.password.take().unwrap_or_default();
    if let Some(err) = validate::validate_password(&password) {
        return Err(AppError::Validation(err));
    }
    ensure_email_free(store, &draft.email, None).await?;

    let user = User::from_draft(new_id(), draft, &admin.id, Utc::now())
        .map_err(AppError::Validation)?;
    let password_hash = password::hash_password(&password).map_err(AppError::Hash)?;

    Repository::<User>::new(store).create(&user).await?;
    Repository::<Credential>::new(store)
        .create(&Credential {
            id: user.id.clone(),
            email: user.email.clone(),
            password_hash,
        })
        .await?;

    log::info!("User {} ({}) created by {}", user.id, user.email, admin.id);
    publish(&hub, ChangeKind::Insert, User::COLLECTION, &user.id);

    Ok(HttpResponse::Created().json(Envelope::ok(user)))
}

/// PUT /api/users/{id}
pub async fn update(
    store: web::Data<dyn DocumentStore>,
    hub: web::Data<ChangeHub>,
    session: Session,
    path: web::Path<String>,
    body: web::Json<UserPatch>,
) -> Result<HttpResponse, AppError> {
    let store = store.get_ref();
    let admin = require_admin(&session, store).await?;
    let id = path.into_inner();
    let patch = body.into_inner();

    let mut user = fetch::<User>(store, &id).await?;
    if let Some(email) = &patch.email {
        ensure_email_free(store, email, Some(&id)).await?;
    }
    let old_email = user.email.clone();
    user.apply_patch(patch, Utc::now())
        .map_err(AppError::Validation)?;
    if !Repository::<User>::new(store).update(&user).await? {
        return Err(AppError::NotFound(User::LABEL.to_string()));
    }

    if user.email != old_email {
        let credentials = Repository::<Credential>::new(store);
        if let Some(mut credential) = credentials.get(&id).await? {
            credential.email = user.email.clone();
            credentials.update(&credential).await?;
        }
    }

    log::info!("User {id} updated by {}", admin.id);
    publish(&hub, ChangeKind::Update, User::COLLECTION, &id);

    Ok(HttpResponse::Ok().json(Envelope::ok(user)))
}

/// DELETE /api/users/{id}
pub async fn delete(
    store: web::Data<dyn DocumentStore>,
    hub: web::Data<ChangeHub>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let store = store.get_ref();
    let admin = require_admin(&session, store).await?;
    let id = path.into_inner();

    if id == admin.id {
        return Err(AppError::Validation(
            "You cannot delete your own account".to_string(),
        ));
    }
    ensure_unreferenced(store, User::COLLECTION, &id, User::LABEL).await?;
    if !Repository::<User>::new(store).delete(&id).await? {
        return Err(AppError::NotFound(User::LABEL.to_string()));
    }
    Repository::<Credential>::new(store).delete(&id).await?;

    log::info!("User {id} deleted by {}", admin.id);
    publish(&hub, ChangeKind::Delete, User::COLLECTION, &id);

    Ok(HttpResponse::Ok().json(Envelope::ok(Deleted { id })))
}
