use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::{
    Config, IMAGE_AGENT_DESCRIPTION, IMAGE_AGENT_INSTRUCTIONS, IMAGE_AGENT_NAME,
};
use crate::llm::types::{AgentCreateRequest, AgentTool, CompletionArgs};
use crate::llm::{GenerativeApi, MistralError};

const IMAGE_GENERATION_TOOL: &str = "image_generation";

#[derive(Debug, Clone)]
pub struct ImageAgentSettings {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
}

impl ImageAgentSettings {
    pub fn from_config(config: &Config) -> Self {
        ImageAgentSettings {
            model: config.image_model.clone(),
            temperature: config.image_temperature,
            top_p: config.image_top_p,
        }
    }

    pub fn create_request(&self) -> AgentCreateRequest {
        AgentCreateRequest {
            model: self.model.clone(),
            name: IMAGE_AGENT_NAME.to_string(),
            description: IMAGE_AGENT_DESCRIPTION.to_string(),
            instructions: IMAGE_AGENT_INSTRUCTIONS.to_string(),
            tools: vec![AgentTool {
                kind: IMAGE_GENERATION_TOOL.to_string(),
            }],
            completion_args: CompletionArgs {
                temperature: self.temperature,
                top_p: self.top_p,
            },
        }
    }
}

/// Hands out the agent id used for an image request. Creates a fresh agent
/// every time unless `reuse` is set, in which case the first successfully
/// created agent is kept for the life of the process.
pub struct ImageAgentProvider {
    settings: ImageAgentSettings,
    reuse: bool,
    cached: Mutex<Option<String>>,
}

impl ImageAgentProvider {
    pub fn new(settings: ImageAgentSettings, reuse: bool) -> Self {
        ImageAgentProvider {
            settings,
            reuse,
            cached: Mutex::new(None),
        }
    }

    pub async fn agent_id(&self, api: &dyn GenerativeApi) -> Result<String, MistralError> {
        if !self.reuse {
            return api.create_agent(&self.settings.create_request()).await;
        }

        // Held across creation so concurrent first requests share one agent.
        let mut cached = self.cached.lock().await;
        if let Some(agent_id) = cached.as_ref() {
            debug!("Reusing image agent {}", agent_id);
            return Ok(agent_id.clone());
        }

        let agent_id = api.create_agent(&self.settings.create_request()).await?;
        info!("Created reusable image agent {}", agent_id);
        *cached = Some(agent_id.clone());
        Ok(agent_id)
    }
}
