use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::api::{Envelope, LoginRequest};
use crate::auth::password;
use crate::auth::session::{current_user, set_user_id};
use crate::errors::AppError;
use crate::models::{Credential, User};
use crate::store::{DocumentStore, Repository};

fn invalid_login() -> HttpResponse {
    HttpResponse::Unauthorized().json(Envelope::error("Invalid email or password"))
}

/// POST /api/auth/login
pub async fn login(
    store: web::Data<dyn DocumentStore>,
    session: Session,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let store = store.get_ref();
    let email = body.email.trim().to_lowercase();

    let credential = Repository::<Credential>::new(store)
        .list()
        .await?
        .into_iter()
        .find(|c| c.email == email);

    let Some(credential) = credential else {
        log::info!("Login failed for unknown email {email}");
        return Ok(invalid_login());
    };
    if !password::verify_password(&body.password, &credential.password_hash) {
        log::info!("Login failed for {email}: wrong password");
        return Ok(invalid_login());
    }
    let Some(user) = Repository::<User>::new(store).get(&credential.id).await? else {
        log::warn!("Credential {} has no user record", credential.id);
        return Ok(invalid_login());
    };

    set_user_id(&session, &user.id)?;
    log::info!("User {} logged in", user.id);
    Ok(HttpResponse::Ok().json(Envelope::ok(user)))
}

/// POST /api/auth/logout
pub async fn logout(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::Ok().json(Envelope::ok(true))
}

/// GET /api/auth/me
pub async fn me(
    store: web::Data<dyn DocumentStore>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(user)))
}
