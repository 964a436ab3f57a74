use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;

use super::{DocumentStore, StoreError};

/// Postgres-backed store: one `documents` table with a JSONB payload.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and apply pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        log::info!("Database migrations complete");
        Ok(PgStore { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let row: Option<(Json<Value>,)> =
            sqlx::query_as("SELECT data FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(Json(doc),)| doc))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let rows: Vec<(Json<Value>,)> =
            sqlx::query_as("SELECT data FROM documents WHERE collection = $1 ORDER BY seq")
                .bind(collection)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(Json(doc),)| doc).collect())
    }

    async fn insert(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        let result = sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id)
            .bind(Json(doc))
            .execute(&self.pool)
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Conflict(format!("{collection}/{id}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn replace(&self, collection: &str, id: &str, doc: Value) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE documents SET data = $3, updated_at = now() WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(doc))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
