use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::Method,
    middleware::Next,
    web,
};

use crate::api::Envelope;
use crate::auth::session::SESSION_USER_KEY;

/// Shared secret checked by [`require_api_key`]. `None` disables the check.
#[derive(Debug, Clone, Default)]
pub struct ApiKey(pub Option<String>);

/// Rejects requests without a logged-in session with a 401 envelope. Runs
/// before the handler, so nothing is read from the store.
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let session = req.get_session();
    let has_user = session
        .get::<String>(SESSION_USER_KEY)
        .unwrap_or(None)
        .is_some();

    if !has_user {
        let response = HttpResponse::Unauthorized().json(Envelope::error("Unauthorized"));
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// CSRF guard for mutations: POST/PUT/DELETE must declare a JSON body.
/// Browsers cannot send cross-origin JSON with cookies from a plain form.
pub async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method();
    if *method == Method::POST || *method == Method::PUT || *method == Method::DELETE {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let response = HttpResponse::BadRequest().json(Envelope::error(
                "Content-Type must be application/json for mutation requests",
            ));
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// When an [`ApiKey`] is configured, every request must echo it in the
/// `apikey` header.
pub async fn require_api_key(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let expected = req
        .app_data::<web::Data<ApiKey>>()
        .and_then(|k| k.0.clone());

    if let Some(expected) = expected {
        let given = req
            .headers()
            .get("apikey")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !constant_time_eq(given, &expected) {
            let response = HttpResponse::Unauthorized().json(Envelope::error("Invalid API key"));
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, middleware::from_fn, test, web};

    use super::*;

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_rt::test]
    async fn api_key_checked_when_configured() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ApiKey(Some("kunci".into()))))
                .wrap(from_fn(require_api_key))
                .route("/", web::get().to(ok)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), 401);

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("apikey", "kunci"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);
    }

    #[actix_rt::test]
    async fn api_key_ignored_when_unset() {
        let app = test::init_service(
            App::new()
                .wrap(from_fn(require_api_key))
                .route("/", web::get().to(ok)),
        )
        .await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), 200);
    }

    #[actix_rt::test]
    async fn mutations_need_json() {
        let app = test::init_service(
            App::new()
                .wrap(from_fn(require_json_content_type))
                .route("/", web::delete().to(ok))
                .route("/", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::delete().uri("/").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let req = test::TestRequest::delete()
            .uri("/")
            .insert_header(("content-type", "application/json"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = test::TestRequest::get().uri("/").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);
    }

    #[actix_rt::test]
    async fn constant_time_eq_works() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "ab"));
    }
}
