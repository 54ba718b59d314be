use crate::config::SheetsConfig;
use crate::error::{FnotifierError, IsRetryable, OauthError};
use crate::service::submission::RowAppender;
use crate::sheets::endpoints::SheetsOauthEndpoints;
use crate::sheets::token::{StoredToken, TokenFile};
use crate::utils::logging::debug_payload;
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use fnotifier_schema::{
    AppendValuesResponse, INSERT_DATA_OPTION_INSERT_ROWS, VALUE_INPUT_OPTION_RAW, ValueRange,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

/// Authorized Sheets API client bound to one spreadsheet range.
///
/// The token is refreshed transparently when it expires and the refreshed token is written
/// back to the token file.
pub struct SheetsClient {
    http: reqwest::Client,
    append_url: Url,
    token: Mutex<StoredToken>,
    endpoints: Arc<SheetsOauthEndpoints>,
    token_file: TokenFile,
    retry_policy: ExponentialBuilder,
}

impl SheetsClient {
    pub(crate) fn new(
        cfg: &SheetsConfig,
        token: StoredToken,
        endpoints: Arc<SheetsOauthEndpoints>,
        token_file: TokenFile,
    ) -> Result<Self, FnotifierError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("fnotifier/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;
        let retry_policy = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(4))
            .with_max_times(cfg.retry_max_times)
            .with_jitter();

        Ok(Self {
            http,
            append_url: build_append_url(&cfg.api_base_url, &cfg.spreadsheet_id, &cfg.range)?,
            token: Mutex::new(token),
            endpoints,
            token_file,
            retry_policy,
        })
    }

    /// Current access token, refreshing it first if it expired.
    async fn access_token(&self) -> Result<String, FnotifierError> {
        let mut token = self.token.lock().await;
        if !token.is_expired() {
            return Ok(token.access_token.clone());
        }

        let refresh_token = token.refresh_token.clone().ok_or_else(|| {
            FnotifierError::UnexpectedError(
                "access token expired and no refresh token is available".to_string(),
            )
        })?;

        let resp = (|| async { self.endpoints.refresh_access_token(&refresh_token).await })
            .retry(self.retry_policy)
            .when(|e: &OauthError| e.is_retryable())
            .notify(|err, dur: Duration| {
                warn!("Sheets token refresh retrying after error {}, sleeping {:?}", err, dur);
            })
            .await?;

        *token = StoredToken::from_response(&resp, Some(refresh_token));
        if let Err(e) = self.token_file.save(&token).await {
            warn!(error = %e, "Refreshed token could not be persisted");
        }
        Ok(token.access_token.clone())
    }

    async fn send_append(
        &self,
        access_token: &str,
        body: &ValueRange,
    ) -> Result<AppendValuesResponse, FnotifierError> {
        let resp = self
            .http
            .post(self.append_url.clone())
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let preview = resp.text().await.unwrap_or_default();
            debug!(%status, body = %format!("{:.200}", preview), "Sheets append rejected");
            return Err(FnotifierError::UpstreamStatus(status));
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl RowAppender for SheetsClient {
    async fn append_row(&self, row: Vec<String>) -> Result<(), FnotifierError> {
        let access_token = self.access_token().await?;
        let body = ValueRange::single_row(row);
        let resp = (|| async { self.send_append(&access_token, &body).await })
            .retry(self.retry_policy)
            .when(|e: &FnotifierError| e.is_retryable())
            .notify(|err, dur: Duration| {
                warn!("Sheets append could not connect ({}), retrying in {:?}", err, dur);
            })
            .await?;

        debug_payload("Sheets append response", &resp);
        info!(
            updated_range = %resp
                .updates
                .as_ref()
                .and_then(|u| u.updated_range.as_deref())
                .unwrap_or("<unknown>"),
            "Row appended to spreadsheet"
        );
        Ok(())
    }
}

/// `{base}/v4/spreadsheets/{id}/values/{range}:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS`
fn build_append_url(base: &Url, spreadsheet_id: &str, range: &str) -> Result<Url, FnotifierError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| {
            FnotifierError::UnexpectedError(format!("Sheets base URL cannot be a base: {base}"))
        })?
        .pop_if_empty()
        .extend(["v4", "spreadsheets", spreadsheet_id, "values"])
        .push(&format!("{range}:append"));
    url.query_pairs_mut()
        .append_pair("valueInputOption", VALUE_INPUT_OPTION_RAW)
        .append_pair("insertDataOption", INSERT_DATA_OPTION_INSERT_ROWS);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_url_targets_configured_range() {
        let base = Url::parse("https://sheets.googleapis.com/").unwrap();
        let url = build_append_url(&base, "1X5nVMQq", "Fnotifier!A2:E").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/1X5nVMQq/values/Fnotifier!A2:E:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS"
        );
    }

    #[test]
    fn append_url_escapes_sheet_names_with_spaces() {
        let base = Url::parse("http://127.0.0.1:9999/mock/").unwrap();
        let url = build_append_url(&base, "sheet", "Contact Form!A2:E").unwrap();
        assert_eq!(url.path(), "/mock/v4/spreadsheets/sheet/values/Contact%20Form!A2:E:append");
    }
}
