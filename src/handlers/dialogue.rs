use anyhow::Result;
use teloxide::types::UserId;
use tracing::{debug, error};

use crate::config::{
    IMAGE_PROMPT_REQUEST_MESSAGE, TEXT_FAILED_MESSAGE, TEXT_PENDING_MESSAGE, TEXT_RESULT_PREFIX,
};
use crate::handlers::generation::{generate_text, send_generated_image};
use crate::handlers::replies::Replier;
use crate::handlers::{send_failure_notice, Outcome};
use crate::state::{AppState, DialogueState};

async fn deliver_text(replier: &dyn Replier, generated: &str) -> Result<()> {
    replier
        .send_text(&format!("{TEXT_RESULT_PREFIX}{generated}"))
        .await?;
    replier.send_text(IMAGE_PROMPT_REQUEST_MESSAGE).await
}

/// Freeform text. An idle user gets generated text and is asked for an image
/// description; a user who was asked gets the image, and goes back to idle
/// whatever the result.
pub async fn free_text_handler(
    state: &AppState,
    replier: &dyn Replier,
    user_id: UserId,
    text: &str,
) -> Result<Outcome> {
    if state.dialogue_state(user_id) == DialogueState::AwaitingImagePrompt {
        debug!("Treating message from {} as image prompt", user_id.0);
        let result = send_generated_image(state, replier, text).await;
        state.dialogues.set(user_id, DialogueState::Idle);
        return result;
    }

    replier.send_text(TEXT_PENDING_MESSAGE).await?;
    match generate_text(state, text).await {
        Ok(generated) => match deliver_text(replier, &generated).await {
            Ok(()) => {
                state
                    .dialogues
                    .set(user_id, DialogueState::AwaitingImagePrompt);
                Ok(Outcome::Completed)
            }
            Err(err) => {
                error!("Failed to deliver text to user {}: {err:#}", user_id.0);
                send_failure_notice(replier, TEXT_FAILED_MESSAGE).await;
                Ok(Outcome::Failed)
            }
        },
        Err(err) => {
            error!("Text generation for user {} failed: {err}", user_id.0);
            replier.send_text(TEXT_FAILED_MESSAGE).await?;
            Ok(Outcome::Failed)
        }
    }
}
