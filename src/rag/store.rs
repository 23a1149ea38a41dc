use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AssistantError;

/// A document chunk held in the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Unique document identifier.
    pub doc_id: String,
    /// The text content used as model context.
    pub content: String,
    /// Source identifier (URL, filename, etc.).
    pub source: String,
    /// Optional metadata (JSON).
    pub metadata: Option<serde_json::Value>,
}

/// Result of a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMatch {
    pub document: StoredDocument,
    /// Similarity score (higher = better).
    pub score: f32,
}

/// Abstract interface over the persisted vector index.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert a document with its embedding vector.
    async fn insert(
        &self,
        document: StoredDocument,
        embedding: Vec<f32>,
    ) -> Result<(), AssistantError>;

    /// Insert multiple documents in batch.
    async fn insert_batch(
        &self,
        items: Vec<(StoredDocument, Vec<f32>)>,
    ) -> Result<(), AssistantError>;

    /// Return up to `limit` documents most similar to the query embedding,
    /// ordered by similarity descending.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<DocumentMatch>, AssistantError>;

    /// Total number of stored documents.
    async fn count(&self) -> Result<usize, AssistantError>;
}
