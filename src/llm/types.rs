use serde::{Deserialize, Serialize};

use crate::llm::ImageGenerationError;

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        ChatMessage {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<MessageContent>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if the model returned any.
    pub fn first_text(&self) -> Option<String> {
        let content = self.choices.first()?.message.content.as_ref()?;
        let text = content.text();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Message content arrives either as a bare string or as a list of typed chunks.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Chunks(Vec<ContentChunk>),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Chunks(Vec::new())
    }
}

impl MessageContent {
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Chunks(chunks) => chunks
                .iter()
                .filter_map(|chunk| match chunk {
                    ContentChunk::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    pub fn chunks(&self) -> &[ContentChunk] {
        match self {
            MessageContent::Text(_) => &[],
            MessageContent::Chunks(chunks) => chunks,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentChunk {
    Text { text: String },
    ToolFile(ToolFileChunk),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ToolFileChunk {
    #[serde(default)]
    pub tool: String,
    pub file_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_type: String,
}

impl ToolFileChunk {
    pub fn display_name(&self) -> String {
        let name = if self.file_name.trim().is_empty() {
            "image"
        } else {
            self.file_name.trim()
        };
        if self.file_type.trim().is_empty() || name.contains('.') {
            name.to_string()
        } else {
            format!("{}.{}", name, self.file_type.trim())
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentTool {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionArgs {
    pub temperature: f32,
    pub top_p: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentCreateRequest {
    pub model: String,
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub tools: Vec<AgentTool>,
    pub completion_args: CompletionArgs,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Agent {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationStartRequest {
    pub agent_id: String,
    pub inputs: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationResponse {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub outputs: Vec<ConversationEntry>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ConversationEntry {
    #[serde(rename = "message.output")]
    MessageOutput {
        #[serde(default)]
        content: MessageContent,
    },
    #[serde(other)]
    Other,
}

impl ConversationResponse {
    /// File produced by a tool in the first message output of the turn.
    pub fn tool_file(&self) -> Result<&ToolFileChunk, ImageGenerationError> {
        let content = self
            .outputs
            .iter()
            .find_map(|entry| match entry {
                ConversationEntry::MessageOutput { content } => Some(content),
                ConversationEntry::Other => None,
            })
            .ok_or(ImageGenerationError::NoMessageOutput)?;

        content
            .chunks()
            .iter()
            .find_map(|chunk| match chunk {
                ContentChunk::ToolFile(file) => Some(file),
                _ => None,
            })
            .ok_or(ImageGenerationError::NoToolFile)
    }
}
