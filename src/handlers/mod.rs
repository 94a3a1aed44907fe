pub mod commands;
pub mod dialogue;
pub mod generation;
pub mod replies;

use tracing::warn;

use crate::handlers::replies::Replier;

/// How a handler finished, for timing logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    MissingArgument,
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Completed => "success",
            Outcome::MissingArgument => "usage",
            Outcome::Failed => "error",
        }
    }
}

/// Sends a failure reply after an earlier send already failed. A second
/// failure is only logged.
pub async fn send_failure_notice(replier: &dyn Replier, text: &str) {
    if let Err(err) = replier.send_text(text).await {
        warn!("Failed to send failure notice: {err:#}");
    }
}
