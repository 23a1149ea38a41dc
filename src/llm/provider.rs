use async_trait::async_trait;
use tokio::sync::mpsc;

use super::types::ChatRequest;
use crate::errors::AssistantError;

/// Chat completion backend. The model identifier is bound at construction,
/// so a provider always answers with the same model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// return the provider name (e.g. "groq")
    fn name(&self) -> &str;

    /// check if the provider is healthy/reachable
    async fn health_check(&self) -> Result<bool, AssistantError>;

    /// chat completion (non-streaming)
    async fn chat(&self, request: ChatRequest) -> Result<String, AssistantError>;

    /// chat completion (streaming)
    async fn stream_chat(
        &self,
        request: ChatRequest,
    ) -> Result<mpsc::Receiver<Result<String, AssistantError>>, AssistantError>;
}
