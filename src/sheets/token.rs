use crate::error::FnotifierError;
use crate::sheets::endpoints::OauthTokenResponse;
use chrono::{DateTime, Duration, Utc};
use oauth2::TokenResponse;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Access tokens are treated as expired this long before their real expiry.
const EXPIRY_SKEW_SECS: i64 = 60;

/// OAuth token as persisted on disk.
///
/// Field names match the token files written by Google's client libraries, so an
/// existing `token.json` keeps working.
#[derive(Clone, Deserialize, Serialize, PartialEq)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl StoredToken {
    /// Build from a token endpoint response. A refresh response usually omits the refresh
    /// token, so the previous one is carried over.
    pub(crate) fn from_response(resp: &OauthTokenResponse, previous_refresh: Option<String>) -> Self {
        let expiry = resp
            .expires_in()
            .and_then(|d| Duration::from_std(d).ok())
            .map(|d| Utc::now() + d);
        Self {
            access_token: resp.access_token().secret().to_string(),
            token_type: default_token_type(),
            refresh_token: resp
                .refresh_token()
                .map(|t| t.secret().to_string())
                .or(previous_refresh),
            expiry,
        }
    }

    /// True when the access token is missing, expired, or about to expire.
    pub fn is_expired(&self) -> bool {
        if self.access_token.is_empty() {
            return true;
        }
        match self.expiry {
            Some(expiry) => Utc::now() + Duration::seconds(EXPIRY_SKEW_SECS) >= expiry,
            None => false,
        }
    }

    /// A token is usable if it can authorize a request now or be refreshed later.
    pub fn is_usable(&self) -> bool {
        !self.is_expired() || self.refresh_token.is_some()
    }
}

/// Token file location. Reads tolerate absence and corruption; writes are atomic.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` when the file is absent or cannot be decoded.
    pub async fn load(&self) -> Option<StoredToken> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Unable to read token file");
                return None;
            }
        };
        match serde_json::from_slice::<StoredToken>(&raw) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring malformed token file");
                None
            }
        }
    }

    pub async fn save(&self, token: &StoredToken) -> Result<(), FnotifierError> {
        let json = serde_json::to_vec_pretty(token)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        restrict_permissions(&tmp).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        info!(path = %self.path.display(), "Saved OAuth token");
        Ok(())
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<(), FnotifierError> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<(), FnotifierError> {
    Ok(())
}
