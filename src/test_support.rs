//! Scripted stand-ins for the generative API and the chat transport.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::handlers::replies::Replier;
use crate::llm::types::{AgentCreateRequest, ConversationResponse};
use crate::llm::{GenerativeApi, ImageAgentProvider, ImageAgentSettings, MistralError};
use crate::state::{AppState, InMemoryDialogueStore};

pub const PNG_BYTES: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Complete { model: String, prompt: String },
    CreateAgent { model: String },
    StartConversation { agent_id: String, inputs: String },
    Download { file_id: String },
}

fn api_error(message: &str) -> MistralError {
    MistralError::Api {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: message.to_string(),
    }
}

pub fn image_conversation(file_id: &str) -> Value {
    json!({
        "conversation_id": "conv_test",
        "outputs": [{
            "type": "message.output",
            "content": [
                { "type": "text", "text": "Here you go." },
                {
                    "type": "tool_file",
                    "tool": "image_generation",
                    "file_id": file_id,
                    "file_name": "image_generated_0",
                    "file_type": "png"
                }
            ]
        }]
    })
}

pub struct MockApi {
    completion: Result<String, String>,
    agent_error: Option<String>,
    conversation: Result<Value, String>,
    download: Result<Vec<u8>, String>,
    calls: Mutex<Vec<ApiCall>>,
}

impl MockApi {
    pub fn new() -> Self {
        MockApi {
            completion: Ok("Generated text".to_string()),
            agent_error: None,
            conversation: Ok(image_conversation("file-1")),
            download: Ok(PNG_BYTES.to_vec()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_completion(mut self, text: &str) -> Self {
        self.completion = Ok(text.to_string());
        self
    }

    pub fn with_completion_error(mut self, message: &str) -> Self {
        self.completion = Err(message.to_string());
        self
    }

    pub fn with_agent_error(mut self, message: &str) -> Self {
        self.agent_error = Some(message.to_string());
        self
    }

    pub fn with_conversation(mut self, outputs: Value) -> Self {
        self.conversation = Ok(outputs);
        self
    }

    pub fn with_conversation_error(mut self, message: &str) -> Self {
        self.conversation = Err(message.to_string());
        self
    }

    pub fn with_download_error(mut self, message: &str) -> Self {
        self.download = Err(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    pub fn downloads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ApiCall::Download { .. }))
            .count()
    }
}

#[async_trait]
impl GenerativeApi for MockApi {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, MistralError> {
        self.calls.lock().push(ApiCall::Complete {
            model: model.to_string(),
            prompt: prompt.to_string(),
        });
        self.completion.clone().map_err(|message| api_error(&message))
    }

    async fn create_agent(&self, request: &AgentCreateRequest) -> Result<String, MistralError> {
        let mut calls = self.calls.lock();
        calls.push(ApiCall::CreateAgent {
            model: request.model.clone(),
        });
        if let Some(message) = &self.agent_error {
            return Err(api_error(message));
        }
        let created = calls
            .iter()
            .filter(|call| matches!(call, ApiCall::CreateAgent { .. }))
            .count();
        Ok(format!("ag_{created}"))
    }

    async fn start_conversation(
        &self,
        agent_id: &str,
        inputs: &str,
    ) -> Result<ConversationResponse, MistralError> {
        self.calls.lock().push(ApiCall::StartConversation {
            agent_id: agent_id.to_string(),
            inputs: inputs.to_string(),
        });
        match &self.conversation {
            Ok(value) => Ok(serde_json::from_value(value.clone())?),
            Err(message) => Err(api_error(message)),
        }
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, MistralError> {
        self.calls.lock().push(ApiCall::Download {
            file_id: file_id.to_string(),
        });
        self.download.clone().map_err(|message| api_error(&message))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text(String),
    Markdown(String),
    Photo {
        bytes: Vec<u8>,
        file_name: String,
        caption: String,
    },
}

/// Records what would reach the chat. Sends can be made to fail; failed
/// sends are not recorded.
#[derive(Default)]
pub struct RecordingReplier {
    sent: Mutex<Vec<Sent>>,
    photo_error: Option<String>,
    failing_text: Option<String>,
}

impl RecordingReplier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_photos(mut self, error: &str) -> Self {
        self.photo_error = Some(error.to_string());
        self
    }

    /// Fails every text send containing `needle`.
    pub fn failing_text(mut self, needle: &str) -> Self {
        self.failing_text = Some(needle.to_string());
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Replier for RecordingReplier {
    async fn send_text(&self, text: &str) -> Result<()> {
        if let Some(needle) = &self.failing_text {
            if text.contains(needle.as_str()) {
                anyhow::bail!("Bad Request: message could not be sent");
            }
        }
        self.sent.lock().push(Sent::Text(text.to_string()));
        Ok(())
    }

    async fn send_markdown(&self, text: &str) -> Result<()> {
        self.sent.lock().push(Sent::Markdown(text.to_string()));
        Ok(())
    }

    async fn send_photo(&self, image: Vec<u8>, file_name: &str, caption: &str) -> Result<()> {
        if let Some(error) = &self.photo_error {
            anyhow::bail!("Bad Request: {error}");
        }
        self.sent.lock().push(Sent::Photo {
            bytes: image,
            file_name: file_name.to_string(),
            caption: caption.to_string(),
        });
        Ok(())
    }
}

pub fn app_state(api: Arc<MockApi>) -> AppState {
    AppState::new(
        Arc::new(InMemoryDialogueStore::new()),
        api,
        ImageAgentProvider::new(
            ImageAgentSettings {
                model: "mistral-medium-2505".to_string(),
                temperature: 0.3,
                top_p: 0.95,
            },
            false,
        ),
        "mistral-large-latest",
    )
}
