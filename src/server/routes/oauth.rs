use crate::error::{FnotifierError, OauthError};
use crate::server::router::FnotifierState;
use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct SheetsCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /sheets/auth
///
/// Redirects the operator's browser to the pending Google consent page.
pub async fn sheets_oauth_entry(
    State(state): State<FnotifierState>,
) -> Result<impl IntoResponse, FnotifierError> {
    let auth_url = state.authorizer.begin().await?;
    info!("Dispatching Sheets OAuth redirect");
    Ok(Redirect::temporary(auth_url.as_str()))
}

/// GET /callback
pub async fn sheets_oauth_callback(
    State(state): State<FnotifierState>,
    Query(query): Query<SheetsCallbackQuery>,
) -> Result<impl IntoResponse, FnotifierError> {
    if let Some(reason) = query.error {
        return Err(
            OauthError::flow("ACCESS_DENIED", format!("Authorization denied: {reason}")).into(),
        );
    }

    let code = query
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or(FnotifierError::MissingAuthorizationCode)?;

    state
        .authorizer
        .complete_callback(code.trim(), query.state.as_deref().unwrap_or_default())
        .await
        .inspect_err(|e| error!(error = %e, "Sheets OAuth callback failed"))?;

    info!("Sheets OAuth callback accepted");
    Ok(Json(json!({ "status": "authorized" })))
}
