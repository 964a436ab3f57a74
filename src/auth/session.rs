use actix_session::Session;

use crate::errors::AppError;
use crate::models::{RecordId, User};
use crate::store::{DocumentStore, Repository};

pub const SESSION_USER_KEY: &str = "user_id";
/// Name of the signed session cookie.
pub const SESSION_COOKIE: &str = "rapat_session";

pub fn get_user_id(session: &Session) -> Option<RecordId> {
    session.get::<RecordId>(SESSION_USER_KEY).unwrap_or(None)
}

pub fn set_user_id(session: &Session, user_id: &str) -> Result<(), AppError> {
    session.renew();
    session
        .insert(SESSION_USER_KEY, user_id)
        .map_err(|e| AppError::Session(e.to_string()))
}

pub fn require_user_id(session: &Session) -> Result<RecordId, AppError> {
    get_user_id(session).ok_or(AppError::Unauthorized)
}

/// The logged-in user. A session pointing at a deleted user is treated as
/// logged out.
pub async fn current_user(
    session: &Session,
    store: &dyn DocumentStore,
) -> Result<User, AppError> {
    let user_id = require_user_id(session)?;
    match Repository::<User>::new(store).get(&user_id).await? {
        Some(user) => Ok(user),
        None => {
            session.purge();
            Err(AppError::Unauthorized)
        }
    }
}

pub async fn require_admin(session: &Session, store: &dyn DocumentStore) -> Result<User, AppError> {
    let user = current_user(session, store).await?;
    if user.is_admin() {
        Ok(user)
    } else {
        Err(AppError::Forbidden("Admin access required".to_string()))
    }
}
