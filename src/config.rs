use std::env;
use std::path::PathBuf;

use crate::errors::AssistantError;

pub const DEFAULT_CHAT_MODEL: &str = "gemma2-9b-it";
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-mpnet-base-v2";
pub const DEFAULT_EMBEDDING_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_TOP_K: usize = 30;

/// Explicit runtime configuration.
///
/// Credentials travel through this struct instead of being written back
/// into the process environment; the only environment access happens in
/// `from_env`, once, at construction time.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Groq API key. Absence is a fatal construction-time failure.
    pub groq_api_key: String,
    /// Chat model identifier the assistant is bound to.
    pub chat_model: String,
    /// Base URL of the OpenAI-compatible embeddings endpoint.
    pub embedding_base_url: String,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Path of the persisted vector index (SQLite database).
    pub index_path: PathBuf,
    /// Number of documents to retrieve per question.
    pub top_k: usize,
    /// Directory for rolling log files.
    pub log_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self, AssistantError> {
        let groq_api_key = env::var("GROQ_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                AssistantError::Config("GROQ_API_KEY is not set".to_string())
            })?;

        let data_dir = discover_data_dir();

        let chat_model =
            env::var("NEWTON_CHAT_MODEL").unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string());
        let embedding_base_url = env::var("NEWTON_EMBEDDING_URL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_URL.to_string());
        let embedding_model = env::var("NEWTON_EMBEDDING_MODEL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string());
        let index_path = env::var("NEWTON_INDEX_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("index.db"));
        let top_k = env::var("NEWTON_TOP_K")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_TOP_K);
        let log_dir = data_dir.join("logs");

        Ok(Settings {
            groq_api_key,
            chat_model,
            embedding_base_url,
            embedding_model,
            index_path,
            top_k,
            log_dir,
        })
    }
}

fn discover_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("NEWTON_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if cfg!(target_os = "windows") {
        let base = env::var("LOCALAPPDATA")
            .unwrap_or_else(|_| env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string()));
        return PathBuf::from(base).join("Newton");
    }

    if cfg!(target_os = "macos") {
        return home_dir()
            .join("Library")
            .join("Application Support")
            .join("Newton");
    }

    let xdg = env::var("XDG_DATA_HOME").unwrap_or_else(|_| {
        home_dir()
            .join(".local/share")
            .to_string_lossy()
            .to_string()
    });
    PathBuf::from(xdg).join("newton")
}

fn home_dir() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
