use super::IsRetryable;
use super::fnotifier::FnotifierError;
use oauth2::basic::BasicErrorResponseType;
use oauth2::{HttpClientError, RequestTokenError, StandardErrorResponse};
use thiserror::Error as ThisError;

/// Longest token endpoint body echoed back in a parse error.
const BODY_PREVIEW_CHARS: usize = 100;

#[derive(Debug, ThisError)]
pub enum OauthError {
    /// The authorization flow was misused: no pending session, bad `state`, consent denied.
    #[error("OAuth flow error: {message}")]
    Flow { code: String, message: String },

    #[error("Token endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// Google answered with an RFC 6749 error object, e.g. `invalid_grant`.
    #[error("Token endpoint rejected the grant: {error}{}", parenthesized(.description))]
    Rejected {
        error: String,
        description: Option<String>,
    },

    #[error("Token endpoint returned an unreadable body: {message}. Body: {body}")]
    MalformedResponse { message: String, body: String },

    #[error("Token request failed: {0}")]
    Other(String),
}

impl OauthError {
    pub fn flow(code: &str, message: impl Into<String>) -> Self {
        OauthError::Flow {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl IsRetryable for OauthError {
    /// Only transport failures are retried; a rejected grant stays rejected.
    fn is_retryable(&self) -> bool {
        matches!(self, OauthError::Transport(_))
    }
}

type TokenRequestError = RequestTokenError<
    HttpClientError<oauth2::reqwest::Error>,
    StandardErrorResponse<BasicErrorResponseType>,
>;

fn parenthesized(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

fn body_preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(BODY_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...<truncated>", &text[..idx]),
        None => text.into_owned(),
    }
}

impl From<TokenRequestError> for OauthError {
    fn from(e: TokenRequestError) -> Self {
        match e {
            RequestTokenError::ServerResponse(resp) => OauthError::Rejected {
                error: resp.error().to_string(),
                description: resp.error_description().cloned(),
            },
            RequestTokenError::Request(HttpClientError::Reqwest(err)) => {
                OauthError::Transport(*err)
            }
            RequestTokenError::Request(other) => OauthError::Other(other.to_string()),
            RequestTokenError::Parse(err, body) => OauthError::MalformedResponse {
                message: err.to_string(),
                body: body_preview(&body),
            },
            RequestTokenError::Other(message) => OauthError::Other(message),
        }
    }
}

impl From<TokenRequestError> for FnotifierError {
    fn from(e: TokenRequestError) -> Self {
        OauthError::from(e).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_grant_is_not_retried() {
        let err = OauthError::Rejected {
            error: "invalid_grant".to_string(),
            description: Some("Bad Request".to_string()),
        };
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Token endpoint rejected the grant: invalid_grant (Bad Request)"
        );
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(250);
        let preview = body_preview(body.as_bytes());
        assert!(preview.ends_with("...<truncated>"));
        assert_eq!(preview.len(), BODY_PREVIEW_CHARS + "...<truncated>".len());
        assert_eq!(body_preview(b"short"), "short");
    }
}
