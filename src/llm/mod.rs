pub mod agents;
pub mod mistral;
pub mod types;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::config::IMAGE_FAILED_MESSAGE;

pub use agents::{ImageAgentProvider, ImageAgentSettings};
pub use mistral::MistralClient;
pub use types::{AgentCreateRequest, ConversationResponse};

#[derive(Debug, thiserror::Error)]
pub enum MistralError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Mistral API error (status {status}): {message}")]
    Api { status: StatusCode, message: String },
    #[error("Failed to decode Mistral response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Mistral returned no completion text")]
    EmptyCompletion,
}

#[derive(Debug, thiserror::Error)]
pub enum ImageGenerationError {
    #[error("agent creation failed: {0}")]
    AgentCreate(#[source] MistralError),
    #[error("conversation start failed: {0}")]
    ConversationStart(#[source] MistralError),
    #[error("conversation returned no message output")]
    NoMessageOutput,
    #[error("message output contained no tool file")]
    NoToolFile,
    #[error("file download failed: {0}")]
    Download(#[source] MistralError),
}

impl ImageGenerationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ImageGenerationError::NoToolFile => "❌ Файл изображения не найден.",
            ImageGenerationError::Download(_) => "❌ Не удалось загрузить изображение.",
            ImageGenerationError::AgentCreate(_)
            | ImageGenerationError::ConversationStart(_)
            | ImageGenerationError::NoMessageOutput => IMAGE_FAILED_MESSAGE,
        }
    }
}

/// The calls the bot makes against the generative API.
#[async_trait]
pub trait GenerativeApi: Send + Sync {
    /// Single user-role chat completion; returns the first choice's text.
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, MistralError>;

    /// Creates an agent and returns its id.
    async fn create_agent(&self, request: &AgentCreateRequest) -> Result<String, MistralError>;

    async fn start_conversation(
        &self,
        agent_id: &str,
        inputs: &str,
    ) -> Result<ConversationResponse, MistralError>;

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, MistralError>;
}
