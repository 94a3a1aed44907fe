use std::fmt::Display;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use teloxide::types::Message;
use tracing::info;

const LOGGED_TEXT_LIMIT: usize = 300;

#[derive(Debug)]
pub struct CommandTimer {
    command: String,
    chat_id: i64,
    user_id: Option<u64>,
    username: Option<String>,
    message_id: i32,
    text: Option<String>,
    started_at: DateTime<Utc>,
    started_perf: Instant,
    status: String,
    detail: Option<String>,
    completed: bool,
}

fn single_line_preview(value: &str) -> String {
    let flattened = value.replace('\n', " ");
    if flattened.chars().count() <= LOGGED_TEXT_LIMIT {
        return flattened;
    }
    flattened.chars().take(LOGGED_TEXT_LIMIT).collect()
}

impl CommandTimer {
    pub fn from_message(command: &str, message: &Message) -> Self {
        let user = message.from.as_ref();
        CommandTimer {
            command: command.to_string(),
            chat_id: message.chat.id.0,
            user_id: user.map(|u| u.id.0),
            username: user.and_then(|u| u.username.clone()),
            message_id: message.id.0,
            text: message.text().map(single_line_preview),
            started_at: Utc::now(),
            started_perf: Instant::now(),
            status: "success".to_string(),
            detail: None,
            completed: false,
        }
    }

    pub fn log_received(&self) {
        info!(
            target: "bot.timing",
            "event=command_received command={} chat_id={} user_id={:?} username={:?} message_id={} received_at={} text={:?}",
            self.command,
            self.chat_id,
            self.user_id,
            self.username,
            self.message_id,
            self.started_at.to_rfc3339(),
            self.text
        );
    }

    pub fn mark_status(&mut self, status: &str, detail: Option<String>) {
        self.status = status.to_string();
        self.detail = detail;
    }

    pub fn log_completed(&mut self) {
        if self.completed {
            return;
        }
        self.completed = true;
        let completed_at = Utc::now();
        let duration = self.started_perf.elapsed().as_secs_f64();
        info!(
            target: "bot.timing",
            "event=command_completed command={} chat_id={} user_id={:?} message_id={} started_at={} response_sent_at={} duration_s={:.3} status={} detail={}",
            self.command,
            self.chat_id,
            self.user_id,
            self.message_id,
            self.started_at.to_rfc3339(),
            completed_at.to_rfc3339(),
            duration,
            self.status,
            self.detail.clone().unwrap_or_default()
        );
    }
}

pub fn start_command_timer(command: &str, message: &Message) -> CommandTimer {
    let timer = CommandTimer::from_message(command, message);
    timer.log_received();
    timer
}

pub fn complete_command_timer(timer: &mut CommandTimer, status: &str, detail: Option<String>) {
    timer.mark_status(status, detail);
    timer.log_completed();
}

pub async fn log_llm_timing<T, E, F, Fut>(
    provider: &str,
    model: &str,
    operation: &str,
    metadata: Option<JsonValue>,
    call: F,
) -> Result<T, E>
where
    E: Display,
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let started_at = Utc::now();
    let started_perf = Instant::now();
    let metadata_text = metadata
        .as_ref()
        .map(|value| value.to_string())
        .unwrap_or_else(|| "{}".to_string());
    info!(
        target: "bot.timing",
        "event=llm_request provider={} model={} operation={} started_at={} metadata={}",
        provider,
        model,
        operation,
        started_at.to_rfc3339(),
        metadata_text
    );

    let result = call().await;
    let (status, error) = match &result {
        Ok(_) => ("success", String::new()),
        Err(err) => ("error", err.to_string()),
    };

    let completed_at = Utc::now();
    let duration = started_perf.elapsed().as_secs_f64();
    info!(
        target: "bot.timing",
        "event=llm_response provider={} model={} operation={} completed_at={} duration_s={:.3} status={} error={:?} metadata={}",
        provider,
        model,
        operation,
        completed_at.to_rfc3339(),
        duration,
        status,
        error,
        metadata_text
    );

    result
}
