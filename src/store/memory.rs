use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use super::{DocumentStore, StoreError};

type Collections = HashMap<String, Vec<(String, Value)>>;

/// In-process store used by tests and when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
    reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get`/`list` calls served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn read_guard(&self) -> Result<std::sync::RwLockReadGuard<'_, Collections>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.collections.read().map_err(|_| StoreError::Poisoned)
    }

    fn write_guard(&self) -> Result<std::sync::RwLockWriteGuard<'_, Collections>, StoreError> {
        self.collections.write().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let guard = self.read_guard()?;
        Ok(guard
            .get(collection)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| doc_id == id))
            .map(|(_, doc)| doc.clone()))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let guard = self.read_guard()?;
        Ok(guard
            .get(collection)
            .map(|docs| docs.iter().map(|(_, doc)| doc.clone()).collect())
            .unwrap_or_default())
    }

    async fn insert(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        let mut guard = self.write_guard()?;
        let docs = guard.entry(collection.to_string()).or_default();
        if docs.iter().any(|(doc_id, _)| doc_id == id) {
            return Err(StoreError::Conflict(format!("{collection}/{id}")));
        }
        docs.push((id.to_string(), doc));
        Ok(())
    }

    async fn replace(&self, collection: &str, id: &str, doc: Value) -> Result<bool, StoreError> {
        let mut guard = self.write_guard()?;
        let slot = guard
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|(doc_id, _)| doc_id == id));
        match slot {
            Some((_, existing)) => {
                *existing = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut guard = self.write_guard()?;
        let Some(docs) = guard.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|(doc_id, _)| doc_id != id);
        Ok(docs.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[actix_rt::test]
    async fn insert_get_replace_delete() {
        let store = MemoryStore::new();
        store.insert("tasks", "1", json!({"id": "1", "title": "a"})).await.unwrap();
        store.insert("tasks", "2", json!({"id": "2", "title": "b"})).await.unwrap();

        assert!(matches!(
            store.insert("tasks", "1", json!({})).await,
            Err(StoreError::Conflict(_))
        ));

        assert!(store.replace("tasks", "1", json!({"id": "1", "title": "c"})).await.unwrap());
        assert!(!store.replace("tasks", "9", json!({})).await.unwrap());
        assert_eq!(store.get("tasks", "1").await.unwrap().unwrap()["title"], "c");

        let titles: Vec<_> = store
            .list("tasks")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d["title"].clone())
            .collect();
        assert_eq!(titles, vec![json!("c"), json!("b")]);

        assert!(store.delete("tasks", "1").await.unwrap());
        assert!(!store.delete("tasks", "1").await.unwrap());
        assert!(store.get("tasks", "1").await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn counts_reads_only() {
        let store = MemoryStore::new();
        store.insert("users", "1", json!({})).await.unwrap();
        assert_eq!(store.reads(), 0);
        store.get("users", "1").await.unwrap();
        store.list("users").await.unwrap();
        assert_eq!(store.reads(), 2);
    }
}
