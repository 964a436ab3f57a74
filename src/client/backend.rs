use async_trait::async_trait;
use futures_util::stream::LocalBoxStream;
use serde_json::Value;

use crate::client::ClientError;
use crate::realtime::ChangeEvent;

/// Change events of one table. Ends when the channel closes.
pub type ChangeStream = LocalBoxStream<'static, ChangeEvent>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

/// One call against the `/api` surface. `path` is relative to `/api`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub verb: Verb,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new(verb: Verb, path: impl Into<String>) -> Self {
        ApiRequest {
            verb,
            path: path.into(),
            query: None,
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Verb::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Verb::Post, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Verb::Put, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Verb::Delete, path)
    }

    pub fn with_query(mut self, query: String) -> Self {
        self.query = (!query.is_empty()).then_some(query);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Transport used by client collections.
///
/// Implementations unwrap the JSON envelope: `Ok` carries `data` (or
/// `Value::Null`), anything else becomes a [`ClientError`]. Futures are not
/// `Send`; collections run on the current thread's local task set.
#[async_trait(?Send)]
pub trait Backend: 'static {
    async fn send(&self, request: ApiRequest) -> Result<Value, ClientError>;

    /// Open the realtime channel of `table`.
    async fn subscribe(&self, table: &str) -> Result<ChangeStream, ClientError>;
}
