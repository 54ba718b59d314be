use crate::utils::logging::debug_payload;
use backon::{BackoffBuilder, ExponentialBuilder};
use fnotifier_schema::Update;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{AdminChatRecorder, TelegramApi};

/// Drains the Bot API update stream for the lifetime of the process.
///
/// Only plain `message` updates touch the admin chat cell; edits, channel posts and any
/// update kinds added later are ignored here.
pub struct TelegramListener {
    api: TelegramApi,
    recorder: AdminChatRecorder,
    poll_timeout_secs: u64,
    offset: Option<i64>,
}

impl TelegramListener {
    pub fn new(api: TelegramApi, recorder: AdminChatRecorder, poll_timeout_secs: u64) -> Self {
        Self {
            api,
            recorder,
            poll_timeout_secs,
            offset: None,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        match self.api.get_me().await {
            Ok(me) => info!(
                username = %me.username.as_deref().unwrap_or("<unknown>"),
                "Telegram bot authorized"
            ),
            Err(e) => warn!(error = %e, "Telegram getMe failed; polling anyway"),
        }

        let mut backoff = new_backoff();
        loop {
            match self
                .api
                .get_updates(self.offset, self.poll_timeout_secs)
                .await
            {
                Ok(updates) => {
                    backoff = new_backoff();
                    for update in updates {
                        self.dispatch(&update);
                    }
                }
                Err(e) => {
                    let delay = backoff.next().unwrap_or(Duration::from_secs(30));
                    warn!(error = %e, ?delay, "Telegram getUpdates failed; backing off");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Advance the offset past `update` and record its sender as the admin chat.
    pub fn dispatch(&mut self, update: &Update) {
        debug_payload("Telegram update", update);

        self.offset = Some(
            self.offset
                .map_or(update.update_id + 1, |o| o.max(update.update_id + 1)),
        );

        if let Some(message) = update.message.as_ref()
            && self.recorder.record(message.chat.id)
        {
            info!(chat_id = message.chat.id, "Admin chat updated from inbound message");
        }
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset
    }
}

fn new_backoff() -> impl Iterator<Item = Duration> {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(1))
        .with_max_delay(Duration::from_secs(30))
        .without_max_times()
        .with_jitter()
        .build()
}
