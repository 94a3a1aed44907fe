use anyhow::Result;
use tracing::{debug, error};

use crate::config::{
    HELP_MESSAGE, IMAGE_USAGE_MESSAGE, START_MESSAGE, TEXT_COMMAND_FAILED_MESSAGE,
    TEXT_PENDING_MESSAGE, TEXT_USAGE_MESSAGE,
};
use crate::handlers::generation::{generate_text, send_generated_image};
use crate::handlers::replies::Replier;
use crate::handlers::{send_failure_notice, Outcome};
use crate::state::AppState;

fn command_argument(arg: Option<String>) -> Option<String> {
    arg.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub async fn start_handler(replier: &dyn Replier) -> Result<Outcome> {
    replier.send_markdown(START_MESSAGE).await?;
    Ok(Outcome::Completed)
}

pub async fn help_handler(replier: &dyn Replier) -> Result<Outcome> {
    replier.send_text(HELP_MESSAGE).await?;
    Ok(Outcome::Completed)
}

/// `/text <prompt>`: relays the completion verbatim, no follow-up.
pub async fn text_handler(
    state: &AppState,
    replier: &dyn Replier,
    prompt: Option<String>,
) -> Result<Outcome> {
    let Some(prompt) = command_argument(prompt) else {
        debug!("/text without a prompt");
        replier.send_text(TEXT_USAGE_MESSAGE).await?;
        return Ok(Outcome::MissingArgument);
    };

    replier.send_text(TEXT_PENDING_MESSAGE).await?;
    match generate_text(state, &prompt).await {
        Ok(text) => match replier.send_text(&text).await {
            Ok(()) => Ok(Outcome::Completed),
            Err(err) => {
                error!("Failed to deliver /text reply: {err:#}");
                send_failure_notice(replier, TEXT_COMMAND_FAILED_MESSAGE).await;
                Ok(Outcome::Failed)
            }
        },
        Err(err) => {
            error!("Text generation for /text failed: {err}");
            replier.send_text(TEXT_COMMAND_FAILED_MESSAGE).await?;
            Ok(Outcome::Failed)
        }
    }
}

pub async fn image_handler(
    state: &AppState,
    replier: &dyn Replier,
    prompt: Option<String>,
) -> Result<Outcome> {
    let Some(prompt) = command_argument(prompt) else {
        debug!("/image without a prompt");
        replier.send_text(IMAGE_USAGE_MESSAGE).await?;
        return Ok(Outcome::MissingArgument);
    };

    send_generated_image(state, replier, &prompt).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IMAGE_CAPTION, IMAGE_DONE_MESSAGE, IMAGE_PENDING_MESSAGE};
    use crate::test_support::{app_state, ApiCall, MockApi, RecordingReplier, Sent};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[tokio::test]
    async fn start_sends_markdown_menu() {
        let replier = RecordingReplier::new();
        start_handler(&replier).await.unwrap();
        assert_eq!(replier.sent(), vec![Sent::Markdown(START_MESSAGE.to_string())]);
    }

    #[tokio::test]
    async fn help_sends_static_text() {
        let replier = RecordingReplier::new();
        help_handler(&replier).await.unwrap();
        assert_eq!(replier.sent(), vec![Sent::Text(HELP_MESSAGE.to_string())]);
    }

    #[tokio::test]
    async fn text_without_argument_replies_with_usage_and_skips_api() {
        for arg in [None, Some(String::new()), Some("   ".to_string())] {
            let api = Arc::new(MockApi::new());
            let state = app_state(api.clone());
            let replier = RecordingReplier::new();

            let outcome = text_handler(&state, &replier, arg).await.unwrap();

            assert_eq!(outcome, Outcome::MissingArgument);
            assert_eq!(replier.sent(), vec![Sent::Text(TEXT_USAGE_MESSAGE.to_string())]);
            assert!(api.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn image_without_argument_replies_with_usage_and_skips_api() {
        let api = Arc::new(MockApi::new());
        let state = app_state(api.clone());
        let replier = RecordingReplier::new();

        let outcome = image_handler(&state, &replier, Some(" ".to_string()))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::MissingArgument);
        assert_eq!(replier.sent(), vec![Sent::Text(IMAGE_USAGE_MESSAGE.to_string())]);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn text_relays_raw_completion() {
        let completion = "Soft rain on tin roofs\n*drumming* the night away\npuddles hold the moon";
        let api = Arc::new(MockApi::new().with_completion(completion));
        let state = app_state(api.clone());
        let replier = RecordingReplier::new();

        let outcome = text_handler(
            &state,
            &replier,
            Some("Write a haiku about rain".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(
            api.calls(),
            vec![ApiCall::Complete {
                model: "mistral-large-latest".to_string(),
                prompt: "Write a haiku about rain".to_string(),
            }]
        );
        assert_eq!(
            replier.sent(),
            vec![
                Sent::Text(TEXT_PENDING_MESSAGE.to_string()),
                Sent::Text(completion.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn text_failure_sends_fixed_message() {
        let api = Arc::new(MockApi::new().with_completion_error("model overloaded"));
        let state = app_state(api);
        let replier = RecordingReplier::new();

        let outcome = text_handler(&state, &replier, Some("hi".to_string()))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(
            replier.sent(),
            vec![
                Sent::Text(TEXT_PENDING_MESSAGE.to_string()),
                Sent::Text(TEXT_COMMAND_FAILED_MESSAGE.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn undeliverable_completion_ends_with_failure_reply() {
        let api = Arc::new(MockApi::new().with_completion("Soft rain"));
        let state = app_state(api);
        let replier = RecordingReplier::new().failing_text("Soft rain");

        let outcome = text_handler(&state, &replier, Some("haiku".to_string()))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(
            replier.sent(),
            vec![
                Sent::Text(TEXT_PENDING_MESSAGE.to_string()),
                Sent::Text(TEXT_COMMAND_FAILED_MESSAGE.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn image_command_runs_image_flow_with_prompt() {
        let api = Arc::new(MockApi::new());
        let state = app_state(api.clone());
        let replier = RecordingReplier::new();

        let outcome = image_handler(&state, &replier, Some("a red fox".to_string()))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Completed);
        assert!(api.calls().contains(&ApiCall::StartConversation {
            agent_id: "ag_1".to_string(),
            inputs: "a red fox".to_string(),
        }));
        let sent = replier.sent();
        assert_eq!(sent.first(), Some(&Sent::Text(IMAGE_PENDING_MESSAGE.to_string())));
        assert!(matches!(&sent[1], Sent::Photo { caption, .. } if caption == IMAGE_CAPTION));
        assert_eq!(sent.last(), Some(&Sent::Text(IMAGE_DONE_MESSAGE.to_string())));
    }
}
