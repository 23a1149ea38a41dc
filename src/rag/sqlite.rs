//! SQLite-backed vector store.
//!
//! In-process index using SQLite for storage and brute-force cosine
//! similarity for search. The index is normally built by a separate
//! ingestion step; `open` refuses to create a new file so that a missing
//! index fails loudly instead of answering from an empty corpus.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::store::{DocumentMatch, StoredDocument, VectorStore};
use crate::errors::AssistantError;

#[derive(Debug)]
pub struct SqliteVectorStore {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SqliteVectorStore {
    /// Open an existing index. Fails with `IndexNotFound` when the file is
    /// absent at the configured path.
    pub async fn open(db_path: PathBuf) -> Result<Self, AssistantError> {
        if !db_path.exists() {
            return Err(AssistantError::IndexNotFound(
                db_path.to_string_lossy().to_string(),
            ));
        }
        Self::connect(db_path, false).await
    }

    /// Create (or open) an index, used by ingestion tooling and tests.
    pub async fn create(db_path: PathBuf) -> Result<Self, AssistantError> {
        Self::connect(db_path, true).await
    }

    async fn connect(db_path: PathBuf, create_if_missing: bool) -> Result<Self, AssistantError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(create_if_missing)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(AssistantError::internal)?;

        let store = Self { pool, db_path };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), AssistantError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                doc_id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                source TEXT NOT NULL DEFAULT '',
                metadata TEXT DEFAULT '{}',
                embedding BLOB,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(AssistantError::internal)?;

        Ok(())
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            0.0
        } else {
            dot / denom
        }
    }

    fn row_to_document(row: &sqlx::sqlite::SqliteRow) -> StoredDocument {
        let metadata_str: String = row.get("metadata");
        let metadata = serde_json::from_str::<Value>(&metadata_str).ok();

        StoredDocument {
            doc_id: row.get("doc_id"),
            content: row.get("content"),
            source: row.get("source"),
            metadata,
        }
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn insert(
        &self,
        document: StoredDocument,
        embedding: Vec<f32>,
    ) -> Result<(), AssistantError> {
        self.insert_batch(vec![(document, embedding)]).await
    }

    async fn insert_batch(
        &self,
        items: Vec<(StoredDocument, Vec<f32>)>,
    ) -> Result<(), AssistantError> {
        if items.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(AssistantError::internal)?;

        for (document, embedding) in &items {
            let blob = Self::serialize_embedding(embedding);
            let metadata_str = document
                .metadata
                .as_ref()
                .map(|m| serde_json::to_string(m).unwrap_or_default())
                .unwrap_or_else(|| "{}".to_string());

            sqlx::query(
                "INSERT OR REPLACE INTO documents (doc_id, content, source, metadata, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&document.doc_id)
            .bind(&document.content)
            .bind(&document.source)
            .bind(&metadata_str)
            .bind(&blob)
            .execute(&mut *tx)
            .await
            .map_err(AssistantError::internal)?;
        }

        tx.commit().await.map_err(AssistantError::internal)?;
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<DocumentMatch>, AssistantError> {
        let rows = sqlx::query(
            "SELECT doc_id, content, source, metadata, embedding FROM documents",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AssistantError::internal)?;

        let mut scored: Vec<DocumentMatch> = rows
            .iter()
            .filter_map(|row| {
                let embedding_bytes: Vec<u8> = row.get("embedding");
                if embedding_bytes.is_empty() {
                    return None;
                }
                let stored_emb = Self::deserialize_embedding(&embedding_bytes);
                let score = Self::cosine_similarity(query_embedding, &stored_emb);

                Some(DocumentMatch {
                    document: Self::row_to_document(row),
                    score,
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit.max(1));

        Ok(scored)
    }

    async fn count(&self) -> Result<usize, AssistantError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await
            .map_err(AssistantError::internal)?;

        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SqliteVectorStore {
        let tmp = std::env::temp_dir().join(format!(
            "newton-index-test-{}.db",
            uuid::Uuid::new_v4()
        ));
        SqliteVectorStore::create(tmp).await.unwrap()
    }

    fn make_document(id: &str, content: &str, source: &str) -> StoredDocument {
        StoredDocument {
            doc_id: id.to_string(),
            content: content.to_string(),
            source: source.to_string(),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn open_fails_when_index_missing() {
        let missing = std::env::temp_dir().join(format!(
            "newton-index-missing-{}.db",
            uuid::Uuid::new_v4()
        ));
        let err = SqliteVectorStore::open(missing).await.unwrap_err();
        assert!(matches!(err, AssistantError::IndexNotFound(_)));
    }

    #[tokio::test]
    async fn insert_and_search() {
        let store = test_store().await;

        let doc = make_document("d1", "A inércia resiste à mudança de movimento", "apostila");
        let embedding = vec![1.0, 0.0, 0.0];

        store.insert(doc, embedding.clone()).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        let results = store.search(&embedding, 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.doc_id, "d1");
        assert!(results[0].score > 0.99);
    }

    #[tokio::test]
    async fn search_ranks_by_similarity_descending() {
        let store = test_store().await;

        store
            .insert_batch(vec![
                (make_document("far", "texto", "doc"), vec![0.0, 1.0, 0.0]),
                (make_document("near", "texto", "doc"), vec![0.9, 0.1, 0.0]),
                (make_document("mid", "texto", "doc"), vec![0.5, 0.5, 0.0]),
            ])
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0, 0.0], 2).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|m| m.document.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid"]);
    }

    #[tokio::test]
    async fn search_on_empty_store_returns_nothing() {
        let store = test_store().await;
        let results = store.search(&[1.0, 0.0], 30).await.unwrap();
        assert!(results.is_empty());
    }
}
