//! REST handlers shared by every [`Resource`]: list, read, create, update,
//! delete.

use std::collections::HashSet;

use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::Utc;

use crate::api::{Deleted, Envelope, ListPage};
use crate::auth::session::{current_user, require_admin};
use crate::errors::AppError;
use crate::models::{Lookup, Meeting, Notulensi, Record, Resource, Task, User, new_id};
use crate::query::{ListQuery, filter, paginate, sort_records};
use crate::realtime::{ChangeEvent, ChangeHub, ChangeKind};
use crate::store::{DocumentStore, Repository, StoreError};

/// Display summaries for expanding `R` records.
pub(crate) async fn load_lookup<R: Resource>(
    store: &dyn DocumentStore,
) -> Result<Lookup, StoreError> {
    let users = Repository::<User>::new(store).list().await?;
    let meetings = if R::EXPANDS_MEETINGS {
        Repository::<Meeting>::new(store).list().await?
    } else {
        Vec::new()
    };
    Ok(Lookup {
        users: users.iter().map(|u| (u.id.clone(), u.summary())).collect(),
        meetings: meetings.iter().map(|m| (m.id.clone(), m.summary())).collect(),
    })
}

pub(crate) async fn expanded<R: Resource>(
    store: &dyn DocumentStore,
    mut record: R,
) -> Result<R, StoreError> {
    let lookup = load_lookup::<R>(store).await?;
    record.expand(&lookup);
    Ok(record)
}

/// Every referenced record must exist.
pub(crate) async fn check_references<R: Resource>(
    store: &dyn DocumentStore,
    record: &R,
) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for (collection, id) in record.references() {
        if !seen.insert((collection, id)) {
            continue;
        }
        if store.get(collection, id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "Referenced {collection} record '{id}' does not exist"
            )));
        }
    }
    Ok(())
}

async fn referrers<R: Resource>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
) -> Result<usize, StoreError> {
    Ok(Repository::<R>::new(store)
        .list()
        .await?
        .iter()
        .filter(|r| {
            r.references()
                .iter()
                .any(|(c, target)| *c == collection && *target == id)
        })
        .count())
}

/// A record still referenced elsewhere cannot be deleted.
pub(crate) async fn ensure_unreferenced(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
    label: &str,
) -> Result<(), AppError> {
    let counts = [
        (Meeting::COLLECTION, referrers::<Meeting>(store, collection, id).await?),
        (Notulensi::COLLECTION, referrers::<Notulensi>(store, collection, id).await?),
        (Task::COLLECTION, referrers::<Task>(store, collection, id).await?),
    ];
    let used: Vec<String> = counts
        .iter()
        .filter(|(_, n)| *n > 0)
        .map(|(table, n)| format!("{n} {table}"))
        .collect();
    if used.is_empty() {
        return Ok(());
    }
    Err(AppError::Validation(format!(
        "{label} is still referenced by {}",
        used.join(", ")
    )))
}

/// Id of the user allowed to write `R`.
pub(crate) async fn authorize_write<R: Resource>(
    session: &Session,
    store: &dyn DocumentStore,
) -> Result<String, AppError> {
    let user = if R::ADMIN_WRITES {
        require_admin(session, store).await?
    } else {
        current_user(session, store).await?
    };
    Ok(user.id)
}

pub(crate) fn publish(hub: &ChangeHub, kind: ChangeKind, table: &str, id: &str) {
    hub.publish(&ChangeEvent::new(kind, table, id));
}

pub(crate) async fn fetch<R: Resource>(store: &dyn DocumentStore, id: &str) -> Result<R, AppError> {
    Repository::<R>::new(store)
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(R::LABEL.to_string()))
}

/// GET /api/{collection}
pub async fn list<R: Resource>(
    store: web::Data<dyn DocumentStore>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let store = store.get_ref();
    let query = query.into_inner();

    let lookup = load_lookup::<R>(store).await?;
    let records: Vec<R> = Repository::<R>::new(store)
        .list()
        .await?
        .into_iter()
        .map(|mut r| {
            r.expand(&lookup);
            r
        })
        .collect();

    let matching = filter::apply(records, &query).map_err(AppError::Validation)?;
    let sorted = sort_records(matching, &query.sort_spec(R::DEFAULT_SORT));
    let (data, pagination) = paginate(sorted, query.page_request());

    Ok(HttpResponse::Ok().json(Envelope::ok(ListPage { data, pagination })))
}

/// GET /api/{collection}/{id}
pub async fn read<R: Resource>(
    store: web::Data<dyn DocumentStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let store = store.get_ref();
    let record = fetch::<R>(store, &path.into_inner()).await?;
    let record = expanded(store, record).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(record)))
}

/// POST /api/{collection}
pub async fn create<R: Resource>(
    store: web::Data<dyn DocumentStore>,
    hub: web::Data<ChangeHub>,
    session: Session,
    body: web::Json<R::Draft>,
) -> Result<HttpResponse, AppError> {
    let store = store.get_ref();
    let actor = authorize_write::<R>(&session, store).await?;

    let record = R::from_draft(new_id(), body.into_inner(), &actor, Utc::now())
        .map_err(AppError::Validation)?;
    check_references(store, &record).await?;
    Repository::<R>::new(store).create(&record).await?;

    log::info!("{} {} created by {actor}", R::LABEL, record.id());
    publish(&hub, ChangeKind::Insert, R::COLLECTION, record.id());

    let record = expanded(store, record).await?;
    Ok(HttpResponse::Created().json(Envelope::ok(record)))
}

/// PUT /api/{collection}/{id}
pub async fn update<R: Resource>(
    store: web::Data<dyn DocumentStore>,
    hub: web::Data<ChangeHub>,
    session: Session,
    path: web::Path<String>,
    body: web::Json<R::Patch>,
) -> Result<HttpResponse, AppError> {
    let store = store.get_ref();
    let actor = authorize_write::<R>(&session, store).await?;
    let id = path.into_inner();

    let mut record = fetch::<R>(store, &id).await?;
    record
        .apply_patch(body.into_inner(), Utc::now())
        .map_err(AppError::Validation)?;
    check_references(store, &record).await?;
    if !Repository::<R>::new(store).update(&record).await? {
        return Err(AppError::NotFound(R::LABEL.to_string()));
    }

    log::info!("{} {id} updated by {actor}", R::LABEL);
    publish(&hub, ChangeKind::Update, R::COLLECTION, &id);

    let record = expanded(store, record).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(record)))
}

/// DELETE /api/{collection}/{id}
pub async fn delete<R: Resource>(
    store: web::Data<dyn DocumentStore>,
    hub: web::Data<ChangeHub>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let store = store.get_ref();
    let actor = authorize_write::<R>(&session, store).await?;
    let id = path.into_inner();

    ensure_unreferenced(store, R::COLLECTION, &id, R::LABEL).await?;
    if !Repository::<R>::new(store).delete(&id).await? {
        return Err(AppError::NotFound(R::LABEL.to_string()));
    }

    log::info!("{} {id} deleted by {actor}", R::LABEL);
    publish(&hub, ChangeKind::Delete, R::COLLECTION, &id);

    Ok(HttpResponse::Ok().json(Envelope::ok(Deleted { id })))
}
