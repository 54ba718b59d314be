use tokio::sync::watch;

pub type ChatId = i64;

/// Create the admin chat cell, optionally pre-seeded with a configured recipient.
///
/// The recorder is owned by the Telegram listener; readers only ever see the latest value.
pub fn admin_chat_channel(initial: Option<ChatId>) -> (AdminChatRecorder, AdminChat) {
    let (tx, rx) = watch::channel(initial);
    (AdminChatRecorder { tx }, AdminChat { rx })
}

/// Write side of the admin chat cell. Last writer wins.
#[derive(Debug)]
pub struct AdminChatRecorder {
    tx: watch::Sender<Option<ChatId>>,
}

impl AdminChatRecorder {
    /// Returns `true` when the stored recipient changed.
    pub fn record(&self, chat_id: ChatId) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == Some(chat_id) {
                false
            } else {
                *current = Some(chat_id);
                true
            }
        })
    }
}

/// Read side of the admin chat cell.
#[derive(Debug, Clone)]
pub struct AdminChat {
    rx: watch::Receiver<Option<ChatId>>,
}

impl AdminChat {
    pub fn current(&self) -> Option<ChatId> {
        *self.rx.borrow()
    }
}
