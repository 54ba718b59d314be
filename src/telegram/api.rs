use crate::config::TelegramConfig;
use crate::error::FnotifierError;
use crate::service::submission::Notifier;
use async_trait::async_trait;
use fnotifier_schema::{BotUser, GetUpdatesRequest, SendMessageRequest, TelegramResponse, Update};
use serde::{Serialize, de::DeserializeOwned};
use std::{fmt, sync::Arc, time::Duration};
use tracing::debug;
use url::Url;

use super::ChatId;

/// Grace period on top of the long-poll timeout before reqwest gives up on `getUpdates`.
const POLL_GRACE: Duration = Duration::from_secs(15);

/// Thin Bot API client. Cloning shares the underlying connection pool.
#[derive(Clone)]
pub struct TelegramApi {
    client: reqwest::Client,
    base_url: Url,
    bot_token: Arc<str>,
}

impl fmt::Debug for TelegramApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramApi")
            .field("base_url", &self.base_url.as_str())
            .field("bot_token", &"<redacted>")
            .finish()
    }
}

impl TelegramApi {
    pub fn new(cfg: &TelegramConfig) -> Result<Self, FnotifierError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fnotifier/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(cfg.poll_timeout_secs) + POLL_GRACE)
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.api_base_url.clone(),
            bot_token: Arc::from(cfg.bot_token.as_str()),
        })
    }

    fn method_url(&self, method: &str) -> Result<Url, FnotifierError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                FnotifierError::UnexpectedError(format!(
                    "Telegram base URL cannot be a base: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .push(&format!("bot{}", self.bot_token))
            .push(method);
        Ok(url)
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, FnotifierError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .client
            .post(self.method_url(method)?)
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        let envelope: TelegramResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => return Err(FnotifierError::UpstreamStatus(status)),
            Err(e) => return Err(e.into()),
        };

        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| "no description".to_string());
            return Err(FnotifierError::Telegram(format!(
                "{method} failed ({}): {description}",
                envelope.error_code.unwrap_or(i64::from(status.as_u16()))
            )));
        }

        envelope
            .result
            .ok_or_else(|| FnotifierError::Telegram(format!("{method} returned no result")))
    }

    pub async fn get_me(&self) -> Result<BotUser, FnotifierError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Long-poll for updates after `offset`, waiting up to `timeout_secs` for new ones.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, FnotifierError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: vec!["message".to_string()],
        };
        self.call("getUpdates", &request).await
    }

    pub async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), FnotifierError> {
        let request = SendMessageRequest { chat_id, text };
        let _: serde_json::Value = self.call("sendMessage", &request).await?;
        debug!(chat_id, "Telegram message delivered");
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramApi {
    async fn notify(&self, chat_id: ChatId, text: &str) -> Result<(), FnotifierError> {
        self.send_message(chat_id, text).await
    }
}
