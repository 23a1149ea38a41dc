pub mod assistant;
pub mod config;
pub mod embedding;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod rag;

pub use assistant::{Assistant, HistoryEntry, PERSONA_TEMPLATE};
pub use config::Settings;
pub use errors::AssistantError;
