use crate::error::FnotifierError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// OAuth client registration as downloaded from the Google Cloud console.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct OauthClientSecret {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub auth_uri: String,
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

/// The console wraps the registration in `web` or `installed` depending on the client type.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ClientSecretFile {
    Web(OauthClientSecret),
    Installed(OauthClientSecret),
}

impl OauthClientSecret {
    pub fn from_json(raw: &[u8]) -> Result<Self, FnotifierError> {
        let file: ClientSecretFile = serde_json::from_slice(raw).map_err(|e| {
            FnotifierError::Config(format!(
                "client secret must contain a `web` or `installed` object: {e}"
            ))
        })?;
        let secret = match file {
            ClientSecretFile::Web(s) | ClientSecretFile::Installed(s) => s,
        };
        if secret.client_id.trim().is_empty() {
            return Err(FnotifierError::Config(
                "client secret has an empty client_id".to_string(),
            ));
        }
        Ok(secret)
    }

    pub fn from_file(path: &Path) -> Result<Self, FnotifierError> {
        let raw = std::fs::read(path).map_err(|e| {
            FnotifierError::Config(format!(
                "unable to read client secret file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&raw)
    }
}
