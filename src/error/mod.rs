mod fnotifier;
mod oauth;

pub use fnotifier::{ApiErrorObject, ApiErrorResponse, FnotifierError, FormField};
pub use oauth::OauthError;

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}
