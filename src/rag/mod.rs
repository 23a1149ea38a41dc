//! Retrieval module.
//!
//! `VectorStore` abstracts the persisted index, `SqliteVectorStore` is the
//! on-disk implementation, and `Retriever` ties a store to an `Embedder`
//! with a fixed result count.

mod retriever;
mod sqlite;
mod store;

pub use retriever::Retriever;
pub use sqlite::SqliteVectorStore;
pub use store::{DocumentMatch, StoredDocument, VectorStore};
