use std::env;
use std::time::Duration;

use anyhow::{anyhow, Result};

pub const IMAGE_AGENT_NAME: &str = "Image Generation Agent";
pub const IMAGE_AGENT_DESCRIPTION: &str = "Agent used to generate images.";
pub const IMAGE_AGENT_INSTRUCTIONS: &str =
    "Use the image generation tool when you have to create images.";

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub mistral_api_key: String,
    pub mistral_base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub image_temperature: f32,
    pub image_top_p: f32,
    pub request_timeout: Duration,
    pub reuse_image_agent: bool,
    pub telegram_max_length: usize,
    pub log_level: String,
    pub log_dir: String,
}

/// Reads configuration values by name; `Config::load` backs it with the
/// process environment.
struct EnvSource<F: Fn(&str) -> Option<String>> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvSource<F> {
    fn raw(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, name: &str) -> Result<String> {
        self.raw(name)
            .map(|value| value.trim().to_string())
            .ok_or_else(|| anyhow!("{name} is required"))
    }

    fn string(&self, name: &str, default: &str) -> String {
        self.raw(name)
            .map(|value| value.trim().to_string())
            .unwrap_or_else(|| default.to_string())
    }

    fn bool(&self, name: &str, default: bool) -> bool {
        match self.raw(name) {
            Some(value) => match value.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => default,
            },
            None => default,
        }
    }

    fn f32(&self, name: &str, default: f32) -> f32 {
        self.raw(name)
            .and_then(|value| value.trim().parse::<f32>().ok())
            .unwrap_or(default)
    }

    fn u64(&self, name: &str, default: u64) -> u64 {
        self.raw(name)
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(default)
    }

    fn usize(&self, name: &str, default: usize) -> usize {
        self.raw(name)
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(default)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = EnvSource { lookup };

        let bot_token = source.required("TELEGRAM_BOT_TOKEN")?;
        let mistral_api_key = source.required("MISTRAL_API_KEY")?;

        Ok(Config {
            bot_token,
            mistral_api_key,
            mistral_base_url: source
                .string("MISTRAL_BASE_URL", "https://api.mistral.ai")
                .trim_end_matches('/')
                .to_string(),
            text_model: source.string("MISTRAL_TEXT_MODEL", "mistral-large-latest"),
            image_model: source.string("MISTRAL_IMAGE_MODEL", "mistral-medium-2505"),
            image_temperature: source.f32("MISTRAL_IMAGE_TEMPERATURE", 0.3),
            image_top_p: source.f32("MISTRAL_IMAGE_TOP_P", 0.95),
            request_timeout: Duration::from_secs(
                source.u64("MISTRAL_REQUEST_TIMEOUT_SECONDS", 120).max(1),
            ),
            reuse_image_agent: source.bool("MISTRAL_REUSE_IMAGE_AGENT", false),
            telegram_max_length: source.usize("TELEGRAM_MAX_LENGTH", 4000).clamp(1, 4096),
            log_level: source.string("LOG_LEVEL", "info").to_lowercase(),
            log_dir: source.string("LOG_DIR", "logs"),
        })
    }
}

pub const START_MESSAGE: &str = "👋 Привет! Я могу сгенерировать посты с текстом и изображением.\n\n\
🔹 `/text <ваш запрос>` — только текст\n\
🔹 `/image <ваш запрос>` — только изображение\n\
🔹 `Просто напишите что-то` — получите текст + изображение\n\
🔹 `/help` — помощь";
pub const HELP_MESSAGE: &str = "Напишите любой запрос, и я создам текст и изображение для вас!";
pub const TEXT_USAGE_MESSAGE: &str = "Введите текст после команды /text";
pub const IMAGE_USAGE_MESSAGE: &str = "Введите описание изображения после команды /image";
pub const TEXT_PENDING_MESSAGE: &str = "📝 Генерирую текст...";
pub const TEXT_RESULT_PREFIX: &str = "✍️ Вот ваш сгенерированный текст:\n\n";
pub const IMAGE_PROMPT_REQUEST_MESSAGE: &str =
    "🎨 Теперь опишите, какое изображение вы хотите к этому тексту:";
pub const TEXT_FAILED_MESSAGE: &str = "❌ Не удалось сгенерировать текст.";
pub const TEXT_COMMAND_FAILED_MESSAGE: &str = "❌ Ошибка при генерации текста.";
pub const IMAGE_PENDING_MESSAGE: &str = "🖼️ Генерирую изображение...";
pub const IMAGE_FAILED_MESSAGE: &str = "❌ Не удалось сгенерировать изображение.";
pub const IMAGE_CAPTION: &str = "🖼️ Ваше сгенерированное изображение";
pub const IMAGE_DONE_MESSAGE: &str = "✅ Ваш пост готов!";
