use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use teloxide::types::{ChatAction, UserId};

use crate::config::Config;
use crate::llm::{GenerativeApi, ImageAgentProvider, ImageAgentSettings, MistralClient};

/// Where a user is in the text-then-image exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogueState {
    #[default]
    Idle,
    AwaitingImagePrompt,
}

impl DialogueState {
    /// What the chat shows while the next message from this user is handled.
    pub fn chat_action(self) -> ChatAction {
        match self {
            DialogueState::Idle => ChatAction::Typing,
            DialogueState::AwaitingImagePrompt => ChatAction::UploadPhoto,
        }
    }
}

/// Per-user dialogue flags. Writes replace the previous state outright.
pub trait DialogueStore: Send + Sync {
    fn get(&self, user_id: UserId) -> Option<DialogueState>;
    fn set(&self, user_id: UserId, state: DialogueState);
}

/// Process-local store; entries live until restart.
#[derive(Default)]
pub struct InMemoryDialogueStore {
    states: Mutex<HashMap<UserId, DialogueState>>,
}

impl InMemoryDialogueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DialogueStore for InMemoryDialogueStore {
    fn get(&self, user_id: UserId) -> Option<DialogueState> {
        self.states.lock().get(&user_id).copied()
    }

    fn set(&self, user_id: UserId, state: DialogueState) {
        self.states.lock().insert(user_id, state);
    }
}

#[derive(Clone)]
pub struct AppState {
    pub dialogues: Arc<dyn DialogueStore>,
    pub api: Arc<dyn GenerativeApi>,
    pub image_agents: Arc<ImageAgentProvider>,
    pub text_model: Arc<str>,
}

impl AppState {
    pub fn new(
        dialogues: Arc<dyn DialogueStore>,
        api: Arc<dyn GenerativeApi>,
        image_agents: ImageAgentProvider,
        text_model: &str,
    ) -> Self {
        AppState {
            dialogues,
            api,
            image_agents: Arc::new(image_agents),
            text_model: Arc::from(text_model),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(InMemoryDialogueStore::new()),
            Arc::new(MistralClient::from_config(config)),
            ImageAgentProvider::new(
                ImageAgentSettings::from_config(config),
                config.reuse_image_agent,
            ),
            &config.text_model,
        )
    }

    pub fn dialogue_state(&self, user_id: UserId) -> DialogueState {
        self.dialogues.get(user_id).unwrap_or_default()
    }
}
