use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::llm::types::{
    Agent, AgentCreateRequest, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
    ConversationResponse, ConversationStartRequest,
};
use crate::llm::{GenerativeApi, MistralError};
use crate::utils::http::get_http_client;
use crate::utils::timing::log_llm_timing;

const PROVIDER: &str = "mistral";
// Timing labels for calls that are not addressed to a model directly.
const AGENT_MODEL: &str = "agent";
const FILES_MODEL: &str = "files";

fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        let message = value
            .get("message")
            .and_then(|v| v.as_str())
            .or_else(|| value.pointer("/error/message").and_then(|v| v.as_str()))
            .or_else(|| value.get("detail").and_then(|v| v.as_str()));
        if let Some(message) = message {
            return truncate_for_log(message, 500);
        }
        return truncate_for_log(&value.to_string(), 2000);
    }

    truncate_for_log(trimmed, 2000)
}

async fn ensure_success(response: Response) -> Result<Response, MistralError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = summarize_error_body(&body);
    warn!("Mistral API error: status={}, body={}", status, message);
    Err(MistralError::Api { status, message })
}

pub struct MistralClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl MistralClient {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Self {
        MistralClient {
            client: get_http_client().clone(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.mistral_api_key.clone(),
            &config.mistral_base_url,
            config.request_timeout,
        )
    }

    pub fn file_content_url(&self, file_id: &str) -> String {
        format!("{}/v1/files/{}/content", self.base_url, file_id)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(self.timeout)
    }

    async fn post_json<Req, Resp>(&self, path: &str, payload: &Req) -> Result<Resp, MistralError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .authorized(self.client.post(&url))
            .json(payload)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| {
            warn!(
                "Failed to parse Mistral response from {}: {} body={}",
                path,
                err,
                truncate_for_log(&body, 2000)
            );
            MistralError::Decode(err)
        })
    }
}

#[async_trait]
impl GenerativeApi for MistralClient {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, MistralError> {
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![ChatMessage::user(prompt)],
        };
        debug!(
            "Mistral chat completion: model={}, prompt_chars={}",
            model,
            prompt.chars().count()
        );

        log_llm_timing(PROVIDER, model, "chat.complete", None, || async {
            let response: ChatCompletionResponse =
                self.post_json("/v1/chat/completions", &request).await?;
            response.first_text().ok_or(MistralError::EmptyCompletion)
        })
        .await
    }

    async fn create_agent(&self, request: &AgentCreateRequest) -> Result<String, MistralError> {
        let metadata = json!({ "name": request.name });
        log_llm_timing(
            PROVIDER,
            &request.model,
            "agents.create",
            Some(metadata),
            || async {
                let agent: Agent = self.post_json("/v1/agents", request).await?;
                debug!("Created Mistral agent {}", agent.id);
                Ok(agent.id)
            },
        )
        .await
    }

    async fn start_conversation(
        &self,
        agent_id: &str,
        inputs: &str,
    ) -> Result<ConversationResponse, MistralError> {
        let request = ConversationStartRequest {
            agent_id: agent_id.to_string(),
            inputs: inputs.to_string(),
        };
        let metadata = json!({ "agent_id": agent_id });

        log_llm_timing(
            PROVIDER,
            AGENT_MODEL,
            "conversations.start",
            Some(metadata),
            || async {
                let response: ConversationResponse =
                    self.post_json("/v1/conversations", &request).await?;
                debug!(
                    "Conversation {:?} returned {} output(s): {:?}",
                    response.conversation_id,
                    response.outputs.len(),
                    response.outputs
                );
                Ok(response)
            },
        )
        .await
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, MistralError> {
        let url = self.file_content_url(file_id);
        let metadata = json!({ "file_id": file_id });

        log_llm_timing(
            PROVIDER,
            FILES_MODEL,
            "files.content",
            Some(metadata),
            || async {
                let response = self.authorized(self.client.get(&url)).send().await?;
                let response = ensure_success(response).await?;
                let bytes = response.bytes().await?;
                debug!("Downloaded {} byte(s) for file {}", bytes.len(), file_id);
                Ok(bytes.to_vec())
            },
        )
        .await
    }
}
