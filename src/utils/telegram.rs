use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::ChatAction;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Telegram clears a chat action after about five seconds.
const CHAT_ACTION_REFRESH: Duration = Duration::from_secs(4);

/// Keeps "typing…" or "sending photo…" visible while a reply is generated.
/// The refresh task stops when the value is dropped.
pub struct ChatActionHeartbeat {
    task: JoinHandle<()>,
}

impl ChatActionHeartbeat {
    pub fn start(bot: Bot, chat_id: ChatId, action: ChatAction) -> Self {
        debug!("Showing {:?} in chat {}", action, chat_id.0);
        let task = tokio::spawn(async move {
            let mut refresh = tokio::time::interval(CHAT_ACTION_REFRESH);
            refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                refresh.tick().await;
                if let Err(err) = bot.send_chat_action(chat_id, action).await {
                    warn!("Failed to send {:?} to chat {}: {err}", action, chat_id.0);
                }
            }
        });
        ChatActionHeartbeat { task }
    }
}

impl Drop for ChatActionHeartbeat {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Splits `text` into pieces of at most `max_chars` characters, preferring
/// line boundaries. Text that already fits is returned as a single piece.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len <= max_chars {
            current.push_str(line);
            current_len += line_len;
            continue;
        }

        if !current.is_empty() {
            parts.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len <= max_chars {
            current.push_str(line);
            current_len = line_len;
            continue;
        }

        let chars: Vec<char> = line.chars().collect();
        for chunk in chars.chunks(max_chars) {
            if chunk.len() == max_chars {
                parts.push(chunk.iter().collect());
            } else {
                current = chunk.iter().collect();
                current_len = chunk.len();
            }
        }
    }

    if !current.is_empty() {
        parts.push(current);
    }
    parts
}
