//! Telegram side of the notifier: the Bot API client, the long-poll listener and the
//! single-slot cell holding the admin chat learned from inbound messages.

mod admin;
mod api;
mod listener;

pub use admin::{AdminChat, AdminChatRecorder, ChatId, admin_chat_channel};
pub use api::TelegramApi;
pub use listener::TelegramListener;

use crate::service::submission::SubmissionReceipt;

/// Text pushed to the admin chat for a new submission.
pub fn format_contact_notification(submission: &SubmissionReceipt) -> String {
    format!(
        "New Contact Request!\n\nName: {}\nEmail: {}\nMessage: {}",
        submission.name, submission.gmail, submission.description
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_lists_every_field() {
        let submission = SubmissionReceipt {
            id: 3,
            name: "Ada".to_string(),
            gmail: "ada@example.com".to_string(),
            description: "Hello".to_string(),
        };
        assert_eq!(
            format_contact_notification(&submission),
            "New Contact Request!\n\nName: Ada\nEmail: ada@example.com\nMessage: Hello"
        );
    }
}
