use crate::db::{DbActorHandle, SubmissionCreate};
use crate::error::{FnotifierError, FormField};
use crate::sheets::ReadinessGate;
use crate::telegram::{AdminChat, ChatId, format_contact_notification};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Persists validated submissions and assigns their ids.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn insert_submission(&self, create: SubmissionCreate) -> Result<i64, FnotifierError>;
}

/// Best-effort outbound notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, chat_id: ChatId, text: &str) -> Result<(), FnotifierError>;
}

/// Appends one row to the configured spreadsheet range.
#[async_trait]
pub trait RowAppender: Send + Sync {
    async fn append_row(&self, row: Vec<String>) -> Result<(), FnotifierError>;
}

#[async_trait]
impl SubmissionStore for DbActorHandle {
    async fn insert_submission(&self, create: SubmissionCreate) -> Result<i64, FnotifierError> {
        DbActorHandle::insert_submission(self, create).await
    }
}

/// Raw form body of `POST /SendForm`. Absent keys decode as empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gmail: String,
    #[serde(default)]
    pub description: String,
}

impl ContactForm {
    /// Rejects the first empty field in the order name, gmail, description.
    pub fn validate(self) -> Result<SubmissionCreate, FnotifierError> {
        let required = [
            (FormField::Name, &self.name),
            (FormField::Gmail, &self.gmail),
            (FormField::Description, &self.description),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(FnotifierError::MissingField(*field));
        }
        Ok(SubmissionCreate {
            name: self.name,
            gmail: self.gmail,
            description: self.description,
        })
    }
}

/// Echo of a persisted submission, as returned to the caller.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SubmissionReceipt {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    #[serde(rename = "email")]
    pub gmail: String,
    pub description: String,
}

impl SubmissionReceipt {
    fn new(id: i64, create: SubmissionCreate) -> Self {
        Self {
            id,
            name: create.name,
            gmail: create.gmail,
            description: create.description,
        }
    }

    fn spreadsheet_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.gmail.clone(),
            self.description.clone(),
        ]
    }
}

/// validate → gate check → persist → notify (best-effort) → append (required).
///
/// There is no transaction across the store and the spreadsheet: a row that was persisted
/// stays persisted when the append fails afterwards.
#[derive(Clone)]
pub struct SubmissionService {
    store: Arc<dyn SubmissionStore>,
    notifier: Arc<dyn Notifier>,
    admin_chat: AdminChat,
    gate: ReadinessGate,
}

impl SubmissionService {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        notifier: Arc<dyn Notifier>,
        admin_chat: AdminChat,
        gate: ReadinessGate,
    ) -> Self {
        Self {
            store,
            notifier,
            admin_chat,
            gate,
        }
    }

    pub async fn submit(&self, form: ContactForm) -> Result<SubmissionReceipt, FnotifierError> {
        let create = form.validate()?;

        let appender = self
            .gate
            .appender()
            .await
            .ok_or(FnotifierError::SheetsNotReady)?;

        let id = self
            .store
            .insert_submission(create.clone())
            .await
            .inspect_err(|e| error!(error = %e, "Failed to persist submission"))?;
        let receipt = SubmissionReceipt::new(id, create);
        info!(id, "Submission persisted");

        match self.admin_chat.current() {
            Some(chat_id) => {
                let text = format_contact_notification(&receipt);
                if let Err(e) = self.notifier.notify(chat_id, &text).await {
                    warn!(id, chat_id, error = %e, "Admin notification failed");
                }
            }
            None => debug!(id, "No admin chat known yet; skipping notification"),
        }

        appender
            .append_row(receipt.spreadsheet_row())
            .await
            .inspect_err(|e| {
                error!(id, error = %e, "Spreadsheet append failed; stored row is kept")
            })?;

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, gmail: &str, description: &str) -> ContactForm {
        ContactForm {
            name: name.to_string(),
            gmail: gmail.to_string(),
            description: description.to_string(),
        }
    }

    fn missing(form: ContactForm) -> Option<FormField> {
        match form.validate() {
            Err(FnotifierError::MissingField(field)) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn first_empty_field_is_reported_in_order() {
        assert_eq!(missing(form("", "", "")), Some(FormField::Name));
        assert_eq!(missing(form("", "a@b.c", "d")), Some(FormField::Name));
        assert_eq!(missing(form("Ada", "", "")), Some(FormField::Gmail));
        assert_eq!(missing(form("Ada", "a@b.c", "")), Some(FormField::Description));
        assert_eq!(missing(form("Ada", "a@b.c", "d")), None);
    }

    #[test]
    fn receipt_serializes_with_public_field_names() {
        let receipt = SubmissionReceipt::new(
            1,
            SubmissionCreate {
                name: "Ada".to_string(),
                gmail: "ada@example.com".to_string(),
                description: "Hello".to_string(),
            },
        );
        assert_eq!(
            serde_json::to_string(&receipt).unwrap(),
            r#"{"_id":1,"name":"Ada","email":"ada@example.com","description":"Hello"}"#
        );
        assert_eq!(
            receipt.spreadsheet_row(),
            vec!["Ada", "ada@example.com", "Hello"]
        );
    }
}
