use std::error::Error;
use std::sync::Arc;

use dotenvy::dotenv;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, UserId};
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info};

mod config;
mod handlers;
mod llm;
mod state;
#[cfg(test)]
mod test_support;
mod utils;

use config::Config;
use handlers::replies::TelegramReplier;
use handlers::{commands, dialogue, Outcome};
use state::AppState;
use utils::logging::init_logging;
use utils::telegram::ChatActionHeartbeat;
use utils::timing::{complete_command_timer, start_command_timer, CommandTimer};

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
enum Command {
    Start,
    Help,
    Text(String),
    Image(String),
}

type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

fn optional_arg(arg: String) -> Option<String> {
    if arg.trim().is_empty() {
        None
    } else {
        Some(arg)
    }
}

/// Sender and text of a message routed to the freeform handler. Anything
/// that did not parse as a known command lands here, slash or not.
fn freeform_input(message: &Message) -> Option<(UserId, &str)> {
    let text = message.text()?;
    let user_id = message.from.as_ref()?.id;
    Some((user_id, text))
}

fn command_chat_action(command: &Command) -> Option<ChatAction> {
    match command {
        Command::Start | Command::Help => None,
        Command::Text(arg) if !arg.trim().is_empty() => Some(ChatAction::Typing),
        Command::Image(arg) if !arg.trim().is_empty() => Some(ChatAction::UploadPhoto),
        Command::Text(_) | Command::Image(_) => None,
    }
}

fn finish_update(timer: &mut CommandTimer, result: anyhow::Result<Outcome>) -> HandlerResult {
    match result {
        Ok(outcome) => complete_command_timer(timer, outcome.as_str(), None),
        Err(err) => {
            error!("Failed to deliver reply: {err:#}");
            complete_command_timer(timer, "error", Some(err.to_string()));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> HandlerResult {
    dotenv().ok();
    let config = Config::load()?;
    let _guards = init_logging(&config.log_level, &config.log_dir);

    info!(
        "Starting Mistral post bot: text_model={}, image_model={}, reuse_image_agent={}",
        config.text_model, config.image_model, config.reuse_image_agent
    );

    let bot = Bot::new(config.bot_token.clone());
    let state = AppState::from_config(&config);
    let config = Arc::new(config);

    let command_handler = dptree::entry()
        .filter_command::<Command>()
        .endpoint(handle_command);

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(dptree::filter(|msg: Message| msg.text().is_some()).endpoint(handle_free_text))
        .endpoint(ignore_message);

    Dispatcher::builder(bot, message_handler)
        .dependencies(dptree::deps![state, config])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");
    Ok(())
}

async fn handle_command(
    bot: Bot,
    state: AppState,
    config: Arc<Config>,
    message: Message,
    command: Command,
) -> HandlerResult {
    let name = match &command {
        Command::Start => "start",
        Command::Help => "help",
        Command::Text(_) => "text",
        Command::Image(_) => "image",
    };

    let mut timer = start_command_timer(name, &message);
    let _chat_action = command_chat_action(&command)
        .map(|action| ChatActionHeartbeat::start(bot.clone(), message.chat.id, action));
    let replier = TelegramReplier::new(bot, message.chat.id, config.telegram_max_length);

    let result = match command {
        Command::Start => commands::start_handler(&replier).await,
        Command::Help => commands::help_handler(&replier).await,
        Command::Text(arg) => commands::text_handler(&state, &replier, optional_arg(arg)).await,
        Command::Image(arg) => commands::image_handler(&state, &replier, optional_arg(arg)).await,
    };

    finish_update(&mut timer, result)
}

async fn handle_free_text(
    bot: Bot,
    state: AppState,
    config: Arc<Config>,
    message: Message,
) -> HandlerResult {
    let Some((user_id, text)) = freeform_input(&message) else {
        debug!("Ignoring message without sender in chat {}", message.chat.id.0);
        return Ok(());
    };

    let mut timer = start_command_timer("free_text", &message);
    let action = state.dialogue_state(user_id).chat_action();
    let _chat_action = ChatActionHeartbeat::start(bot.clone(), message.chat.id, action);
    let replier = TelegramReplier::new(bot, message.chat.id, config.telegram_max_length);

    let result = dialogue::free_text_handler(&state, &replier, user_id, text).await;
    finish_update(&mut timer, result)
}

async fn ignore_message(_message: Message) -> HandlerResult {
    Ok(())
}
