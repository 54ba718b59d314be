use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// How the spreadsheet client obtains its first token when no saved token is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthStrategy {
    /// Only a previously saved token file is accepted; startup fails without one.
    SavedToken,
    /// Print the authorization URL and read the code from stdin.
    Console,
    /// Print the authorization URL and wait for `GET /callback`.
    #[default]
    Callback,
}

/// Spreadsheet target and OAuth configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SheetsConfig {
    /// Target spreadsheet id (required, non-empty).
    /// TOML: `sheets.spreadsheet_id`.
    #[serde(default)]
    pub spreadsheet_id: String,

    /// A1 range rows are appended after.
    /// TOML: `sheets.range`. Default: `Sheet1!A2:E`.
    #[serde(default = "default_range")]
    pub range: String,

    /// Google OAuth client secret JSON (`web` or `installed` layout).
    /// TOML: `sheets.client_secret_path`. Default: `web.json`.
    #[serde(default = "default_client_secret_path")]
    pub client_secret_path: PathBuf,

    /// Where the obtained token is persisted and reloaded from.
    /// TOML: `sheets.token_path`. Default: `token.json`.
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,

    /// TOML: `sheets.auth_strategy`. One of `saved_token`, `console`, `callback`.
    #[serde(default)]
    pub auth_strategy: AuthStrategy,

    /// Overrides the first redirect URI of the client secret file.
    /// TOML: `sheets.redirect_url`. Default: unset.
    #[serde(default)]
    pub redirect_url: Option<Url>,

    /// Sheets API base URL.
    /// TOML: `sheets.api_base_url`. Default: `https://sheets.googleapis.com/`.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: Url,

    /// Max retry attempts for transient append and refresh failures.
    /// TOML: `sheets.retry_max_times`. Default: `3`.
    #[serde(default = "default_retry_max_times")]
    pub retry_max_times: usize,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            range: default_range(),
            client_secret_path: default_client_secret_path(),
            token_path: default_token_path(),
            auth_strategy: AuthStrategy::default(),
            redirect_url: None,
            api_base_url: default_api_base_url(),
            retry_max_times: default_retry_max_times(),
        }
    }
}

fn default_range() -> String {
    "Sheet1!A2:E".to_string()
}

fn default_client_secret_path() -> PathBuf {
    PathBuf::from("web.json")
}

fn default_token_path() -> PathBuf {
    PathBuf::from("token.json")
}

fn default_api_base_url() -> Url {
    Url::parse("https://sheets.googleapis.com/").expect("valid Sheets API URL")
}

fn default_retry_max_times() -> usize {
    3
}
