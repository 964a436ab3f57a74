use std::cell::RefCell;
use std::env;
use std::time::Duration;

use async_trait::async_trait;
use awc::cookie::Cookie;
use awc::http::{Method, header};
use awc::ws::{Frame, Message};
use awc::{Client, ClientRequest};
use futures_util::{SinkExt, StreamExt, stream};
use serde_json::Value;

use crate::api::{Envelope, LoginRequest};
use crate::auth::session::SESSION_COOKIE;
use crate::client::{ApiRequest, Backend, ChangeStream, ClientError, Verb};
use crate::models::User;
use crate::realtime::ChangeEvent;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
const BODY_LIMIT: usize = 16 * 1024 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`Backend`] talking to a running server over HTTP, with the session
/// cookie from [`HttpBackend::login`] replayed on every call.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    session: RefCell<Option<Cookie<'static>>>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        HttpBackend {
            client: Client::builder().timeout(REQUEST_TIMEOUT).finish(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            session: RefCell::new(None),
        }
    }

    /// `RAPAT_API_URL` (default `http://127.0.0.1:8080`) and `RAPAT_API_KEY`.
    pub fn from_env() -> Self {
        let base_url = env::var("RAPAT_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_key = env::var("RAPAT_API_KEY").ok().filter(|v| !v.trim().is_empty());
        Self::new(base_url, api_key)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let body = serde_json::to_value(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let data = self.send(ApiRequest::post("/auth/login", body)).await?;
        Ok(serde_json::from_value(data)?)
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.send(ApiRequest::post("/auth/logout", Value::Null)).await?;
        self.session.replace(None);
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.borrow().is_some()
    }

    fn api_url(&self, path: &str, query: Option<&str>) -> String {
        match query {
            Some(q) => format!("{}/api{path}?{q}", self.base_url),
            None => format!("{}/api{path}", self.base_url),
        }
    }

    fn realtime_url(&self, table: &str) -> String {
        let base = match self.base_url.strip_prefix("http") {
            Some(rest) => format!("ws{rest}"),
            None => self.base_url.clone(),
        };
        format!("{base}/api/realtime?table={table}")
    }

    fn authorize(&self, mut req: ClientRequest) -> ClientRequest {
        if let Some(key) = &self.api_key {
            req = req.insert_header(("apikey", key.as_str()));
        }
        let cookie = self.session.borrow().clone();
        if let Some(cookie) = cookie {
            req = req.cookie(cookie);
        }
        req
    }

    fn remember_session(&self, cookie: Option<Cookie<'static>>) {
        match cookie {
            Some(c) if c.value().is_empty() => {
                self.session.replace(None);
            }
            Some(c) => {
                self.session.replace(Some(c));
            }
            None => {}
        }
    }
}

/// Unwrap a response body. Error bodies that are not an envelope still map
/// to [`ClientError::Api`] with no message.
fn unwrap_envelope(status: u16, success: bool, body: &[u8]) -> Result<Value, ClientError> {
    let envelope = match serde_json::from_slice::<Envelope<Value>>(body) {
        Ok(envelope) => envelope,
        Err(e) if success => return Err(e.into()),
        Err(_) => Envelope {
            success: false,
            data: None,
            error: None,
        },
    };
    if !success || !envelope.success {
        return Err(ClientError::Api {
            status,
            message: envelope.error,
        });
    }
    Ok(envelope.data.unwrap_or(Value::Null))
}

#[async_trait(?Send)]
impl Backend for HttpBackend {
    async fn send(&self, request: ApiRequest) -> Result<Value, ClientError> {
        let method = match request.verb {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Delete => Method::DELETE,
        };
        let url = self.api_url(&request.path, request.query.as_deref());
        log::debug!("{method} {url}");

        let req = self.authorize(self.client.request(method, url));
        let sent = match (request.verb, request.body) {
            (_, Some(body)) => req.send_json(&body).await,
            (Verb::Get, None) => req.send().await,
            // Mutations must declare JSON even without a body.
            (_, None) => {
                req.insert_header((header::CONTENT_TYPE, "application/json"))
                    .send()
                    .await
            }
        };
        let mut resp = sent.map_err(|e| ClientError::Transport(e.to_string()))?;
        self.remember_session(resp.cookie(SESSION_COOKIE));

        let status = resp.status();
        let body = resp
            .body()
            .limit(BODY_LIMIT)
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        unwrap_envelope(status.as_u16(), status.is_success(), &body)
    }

    async fn subscribe(&self, table: &str) -> Result<ChangeStream, ClientError> {
        if !self.is_logged_in() {
            return Err(ClientError::NotLoggedIn);
        }
        let mut req = self.client.ws(self.realtime_url(table));
        if let Some(key) = &self.api_key {
            req = req.header("apikey", key.as_str());
        }
        let cookie = self.session.borrow().clone();
        if let Some(cookie) = cookie {
            req = req.cookie(cookie);
        }
        let (_resp, framed) = req
            .connect()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        log::debug!("Realtime channel open for {table}");

        let events = stream::unfold(framed, |mut framed| async move {
            loop {
                match framed.next().await {
                    Some(Ok(Frame::Text(bytes))) => {
                        match serde_json::from_slice::<ChangeEvent>(&bytes) {
                            Ok(event) => return Some((event, framed)),
                            Err(e) => log::warn!("Ignoring malformed change event: {e}"),
                        }
                    }
                    Some(Ok(Frame::Ping(bytes))) => {
                        if framed.send(Message::Pong(bytes)).await.is_err() {
                            return None;
                        }
                    }
                    Some(Ok(Frame::Close(_))) | None => return None,
                    Some(Err(e)) => {
                        log::warn!("Realtime channel error: {e}");
                        return None;
                    }
                    Some(Ok(_)) => {}
                }
            }
        });
        Ok(events.boxed_local())
    }
}
