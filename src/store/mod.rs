//! Document storage behind an injected interface.
//!
//! Every entity is a JSON document addressed by `(collection, id)`. Handlers
//! work through [`Repository`], which adds typing on top of whichever
//! [`DocumentStore`] the application was started with.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::Record;

pub mod memory;
pub mod postgres;
pub mod seed;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug)]
pub enum StoreError {
    Db(sqlx::Error),
    Migrate(sqlx::migrate::MigrateError),
    Serde(serde_json::Error),
    /// A document with this id already exists in the collection.
    Conflict(String),
    Poisoned,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Db(e) => write!(f, "Database error: {e}"),
            StoreError::Migrate(e) => write!(f, "Migration error: {e}"),
            StoreError::Serde(e) => write!(f, "Document encoding error: {e}"),
            StoreError::Conflict(key) => write!(f, "Document already exists: {key}"),
            StoreError::Poisoned => write!(f, "Store lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Db(e)
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        StoreError::Migrate(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serde(e)
    }
}

/// Untyped document storage. `list` returns documents in insertion order.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    async fn insert(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError>;

    /// Returns false when there was nothing to replace.
    async fn replace(&self, collection: &str, id: &str, doc: Value) -> Result<bool, StoreError>;

    /// Returns false when there was nothing to delete.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;
}

pub type SharedStore = Arc<dyn DocumentStore>;

/// Typed view of one collection.
pub struct Repository<'a, R> {
    store: &'a dyn DocumentStore,
    _record: PhantomData<fn() -> R>,
}

impl<'a, R: Record> Repository<'a, R> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Repository {
            store,
            _record: PhantomData,
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<R>, StoreError> {
        match self.store.get(R::COLLECTION, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.store.get(R::COLLECTION, id).await?.is_some())
    }

    /// Documents that no longer decode are skipped with a warning.
    pub async fn list(&self) -> Result<Vec<R>, StoreError> {
        let docs = self.store.list(R::COLLECTION).await?;
        Ok(docs
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<R>(doc) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping undecodable {} document: {e}", R::COLLECTION);
                    None
                }
            })
            .collect())
    }

    pub async fn create(&self, record: &R) -> Result<(), StoreError> {
        let doc = serde_json::to_value(record)?;
        self.store.insert(R::COLLECTION, record.id(), doc).await
    }

    pub async fn update(&self, record: &R) -> Result<bool, StoreError> {
        let doc = serde_json::to_value(record)?;
        self.store.replace(R::COLLECTION, record.id(), doc).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete(R::COLLECTION, id).await
    }
}
