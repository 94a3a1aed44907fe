use anyhow::Result;
use tracing::{error, info, warn};

use crate::config::{
    IMAGE_CAPTION, IMAGE_DONE_MESSAGE, IMAGE_FAILED_MESSAGE, IMAGE_PENDING_MESSAGE,
};
use crate::handlers::replies::Replier;
use crate::handlers::{send_failure_notice, Outcome};
use crate::llm::{ImageGenerationError, MistralError};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

pub async fn generate_text(state: &AppState, prompt: &str) -> Result<String, MistralError> {
    state.api.complete(&state.text_model, prompt).await
}

/// Agent, conversation turn, tool file lookup, download. Each step fails with
/// its own error kind.
pub async fn generate_image(
    state: &AppState,
    prompt: &str,
) -> Result<GeneratedImage, ImageGenerationError> {
    let api = state.api.as_ref();

    let agent_id = state
        .image_agents
        .agent_id(api)
        .await
        .map_err(ImageGenerationError::AgentCreate)?;

    let conversation = api
        .start_conversation(&agent_id, prompt)
        .await
        .map_err(ImageGenerationError::ConversationStart)?;

    let file = conversation.tool_file()?;
    info!(
        "Image tool produced file {} ({}) via {}",
        file.file_id, file.file_type, file.tool
    );

    let bytes = api
        .download_file(&file.file_id)
        .await
        .map_err(ImageGenerationError::Download)?;

    Ok(GeneratedImage {
        bytes,
        file_name: file.display_name(),
    })
}

async fn deliver_image(replier: &dyn Replier, image: GeneratedImage) -> Result<()> {
    replier
        .send_photo(image.bytes, &image.file_name, IMAGE_CAPTION)
        .await?;
    replier.send_text(IMAGE_DONE_MESSAGE).await
}

/// Runs the image flow for `prompt` and reports progress and the result to
/// the chat. Any failure after the acknowledgement, including a rejected
/// photo, ends as a single failure reply.
pub async fn send_generated_image(
    state: &AppState,
    replier: &dyn Replier,
    prompt: &str,
) -> Result<Outcome> {
    replier.send_text(IMAGE_PENDING_MESSAGE).await?;

    match generate_image(state, prompt).await {
        Ok(image) => match deliver_image(replier, image).await {
            Ok(()) => Ok(Outcome::Completed),
            Err(err) => {
                error!("Failed to deliver generated image: {err:#}");
                send_failure_notice(replier, IMAGE_FAILED_MESSAGE).await;
                Ok(Outcome::Failed)
            }
        },
        Err(err) => {
            match &err {
                ImageGenerationError::NoMessageOutput | ImageGenerationError::NoToolFile => {
                    warn!("Image generation returned no file: {err}")
                }
                _ => error!("Image generation failed: {err}"),
            }
            replier.send_text(err.user_message()).await?;
            Ok(Outcome::Failed)
        }
    }
}
