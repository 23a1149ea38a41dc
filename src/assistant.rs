//! Conversational retrieval assistant.
//!
//! One orchestration: map the webhook history into chat messages, retrieve
//! supporting documents for the question, stuff them into the persona
//! template, and ask the chat model. No state survives between calls; the
//! caller passes the full history every time.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::config::Settings;
use crate::embedding::HttpEmbedder;
use crate::errors::AssistantError;
use crate::llm::types::{ChatMessage, ChatRequest};
use crate::llm::{ChatModel, GroqProvider};
use crate::rag::{DocumentMatch, Retriever, SqliteVectorStore};

/// System instructions for the "Professor Newton" persona, with a
/// `{context}` slot filled from retrieval.
pub const PERSONA_TEMPLATE: &str = "\
Você é o Professor Newton, um assistente especializado em Física Mecânica, criado para responder dúvidas de alunos de forma clara, \
objetiva e humanizada. Seu objetivo é fornecer explicações diretas, respeitosas e acessíveis, como se estivesse em um bate-papo \
natural, sempre em portugues brasileiro.
Regras para Respostas:
Foque exclusivamente em Física Mecânica.
Se o usuário perguntar sobre outro assunto, responda educadamente que você foi treinado apenas para Física Mecânica.
Mantenha um tom natural e amigável.
Escreva de forma clara, como um professor conversando com um aluno.
Use exemplos do dia a dia para tornar o conteúdo mais compreensível.
Seja direto e didático.
Explique conceitos de forma objetiva, sem respostas muito longas ou complexas.
Se necessário, divida explicações em passos para facilitar o entendimento.
Leve em consideração o histórico da conversa.
Se um aluno já fez perguntas anteriores, conecte as respostas para manter a coerência.
Demonstre paciência e incentivo ao aprendizado.
Caso o aluno demonstre dificuldade, reforce a explicação com exemplos diferentes.
<context>
{context}
</context>";

/// One entry of the external conversation history, in the shape the
/// messaging webhook delivers it.
///
/// `from_me == true` maps to the user role and `from_me == false` to the
/// assistant role. The polarity mirrors the deployed system and is kept
/// as-is; flipping it changes which side of the conversation the model
/// believes it wrote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "fromMe")]
    pub from_me: bool,
    pub body: String,
}

pub struct Assistant {
    chat: Arc<dyn ChatModel>,
    retriever: Retriever,
}

impl Assistant {
    /// Build with injected collaborators. Tests substitute doubles here.
    pub fn new(chat: Arc<dyn ChatModel>, retriever: Retriever) -> Self {
        Self { chat, retriever }
    }

    /// Production wiring: Groq chat, HTTP embedder, persisted SQLite index.
    pub async fn from_settings(settings: &Settings) -> Result<Self, AssistantError> {
        let chat = Arc::new(GroqProvider::new(
            settings.groq_api_key.clone(),
            settings.chat_model.clone(),
        ));
        let embedder = Arc::new(HttpEmbedder::new(
            settings.embedding_base_url.clone(),
            settings.embedding_model.clone(),
        ));
        let store = Arc::new(SqliteVectorStore::open(settings.index_path.clone()).await?);
        let retriever = Retriever::new(embedder, store, settings.top_k);

        Ok(Self::new(chat, retriever))
    }

    /// Answer `question` given the full conversation history.
    ///
    /// Retrieval sees the raw question only, never history-augmented text.
    /// Errors from the embedder, store, or chat model propagate unchanged.
    pub async fn invoke(
        &self,
        history: &[HistoryEntry],
        question: &str,
    ) -> Result<String, AssistantError> {
        let request = self.build_request(history, question).await?;
        self.chat.chat(request).await
    }

    /// Streaming variant: same prompt assembly, answer arrives as chunks.
    pub async fn invoke_stream(
        &self,
        history: &[HistoryEntry],
        question: &str,
    ) -> Result<mpsc::Receiver<Result<String, AssistantError>>, AssistantError> {
        let request = self.build_request(history, question).await?;
        self.chat.stream_chat(request).await
    }

    async fn build_request(
        &self,
        history: &[HistoryEntry],
        question: &str,
    ) -> Result<ChatRequest, AssistantError> {
        let matches = self.retriever.retrieve(question).await?;
        tracing::info!(
            "answering with {} context documents, {} history entries",
            matches.len(),
            history.len()
        );

        let system = PERSONA_TEMPLATE.replace("{context}", &stuff_context(&matches));

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system));
        messages.extend(build_history_messages(history, question));

        Ok(ChatRequest::new(messages))
    }
}

/// Map history entries to chat messages, appending the question as the
/// final user message. An empty retrieval leaves the context slot empty;
/// the call still proceeds.
fn build_history_messages(history: &[HistoryEntry], question: &str) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = history
        .iter()
        .map(|entry| {
            if entry.from_me {
                ChatMessage::user(entry.body.clone())
            } else {
                ChatMessage::assistant(entry.body.clone())
            }
        })
        .collect();
    messages.push(ChatMessage::user(question.to_string()));
    messages
}

/// Concatenate retrieved documents, in store order, into one context block.
fn stuff_context(matches: &[DocumentMatch]) -> String {
    matches
        .iter()
        .map(|m| m.document.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
