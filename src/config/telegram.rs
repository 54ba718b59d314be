use serde::{Deserialize, Serialize};
use url::Url;

/// Telegram bot configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    /// Bot API token issued by BotFather (required, non-empty).
    /// TOML: `telegram.bot_token`. Env: `TG_BOT_TOKEN`.
    #[serde(default)]
    pub bot_token: String,

    /// Bot API base URL. Overridable for self-hosted Bot API servers.
    /// TOML: `telegram.api_base_url`. Default: `https://api.telegram.org/`.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: Url,

    /// Long-poll timeout passed to `getUpdates`, in seconds.
    /// TOML: `telegram.poll_timeout_secs`. Default: `60`.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// Recipient used until the first inbound message is observed.
    /// TOML: `telegram.admin_chat_id`. Default: unset.
    #[serde(default)]
    pub admin_chat_id: Option<i64>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base_url: default_api_base_url(),
            poll_timeout_secs: default_poll_timeout_secs(),
            admin_chat_id: None,
        }
    }
}

fn default_api_base_url() -> Url {
    Url::parse("https://api.telegram.org/").expect("valid Telegram Bot API URL")
}

fn default_poll_timeout_secs() -> u64 {
    60
}
