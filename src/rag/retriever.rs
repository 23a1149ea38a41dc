use std::sync::Arc;

use crate::embedding::Embedder;
use crate::errors::AssistantError;

use super::store::{DocumentMatch, VectorStore};

/// Similarity retriever over a vector store.
///
/// Embeds the raw query text and returns up to `top_k` matches ordered by
/// similarity descending. Tie-breaking is left to the store.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, top_k: usize) -> Self {
        Self {
            embedder,
            store,
            top_k,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub async fn retrieve(&self, query: &str) -> Result<Vec<DocumentMatch>, AssistantError> {
        let embeddings = self.embedder.embed(&[query.to_string()]).await?;
        let query_embedding = embeddings.into_iter().next().ok_or_else(|| {
            AssistantError::Upstream("embedding backend returned no vector".to_string())
        })?;

        let matches = self.store.search(&query_embedding, self.top_k).await?;
        tracing::debug!("retrieved {} documents for query", matches.len());
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::rag::store::StoredDocument;

    struct StubEmbedder {
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AssistantError> {
            self.queries.lock().unwrap().extend(inputs.iter().cloned());
            Ok(inputs.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    struct FixedStore {
        matches: Vec<DocumentMatch>,
        limits: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl VectorStore for FixedStore {
        async fn insert(
            &self,
            _document: StoredDocument,
            _embedding: Vec<f32>,
        ) -> Result<(), AssistantError> {
            unimplemented!("read-only store")
        }

        async fn insert_batch(
            &self,
            _items: Vec<(StoredDocument, Vec<f32>)>,
        ) -> Result<(), AssistantError> {
            unimplemented!("read-only store")
        }

        async fn search(
            &self,
            _query_embedding: &[f32],
            limit: usize,
        ) -> Result<Vec<DocumentMatch>, AssistantError> {
            self.limits.lock().unwrap().push(limit);
            Ok(self.matches.clone())
        }

        async fn count(&self) -> Result<usize, AssistantError> {
            Ok(self.matches.len())
        }
    }

    fn match_for(id: &str, score: f32) -> DocumentMatch {
        DocumentMatch {
            document: StoredDocument {
                doc_id: id.to_string(),
                content: format!("conteúdo {id}"),
                source: "apostila".to_string(),
                metadata: None,
            },
            score,
        }
    }

    #[tokio::test]
    async fn retrieve_embeds_raw_query_and_passes_top_k() {
        let embedder = Arc::new(StubEmbedder {
            queries: Mutex::new(Vec::new()),
        });
        let store = Arc::new(FixedStore {
            matches: vec![match_for("d1", 0.9)],
            limits: Mutex::new(Vec::new()),
        });

        let retriever = Retriever::new(embedder.clone(), store.clone(), 30);
        let matches = retriever.retrieve("O que é inércia?").await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(
            embedder.queries.lock().unwrap().as_slice(),
            ["O que é inércia?"]
        );
        assert_eq!(store.limits.lock().unwrap().as_slice(), [30]);
    }
}
