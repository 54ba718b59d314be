use crate::error::FnotifierError;
use crate::server::router::FnotifierState;
use crate::server::routes::extract::ContactFormBody;
use crate::service::submission::SubmissionReceipt;
use axum::{Json, extract::State};

/// POST /SendForm
///
/// Fields `name`, `gmail`, `description`, url-encoded or multipart.
pub async fn send_form(
    State(state): State<FnotifierState>,
    ContactFormBody(form): ContactFormBody,
) -> Result<Json<SubmissionReceipt>, FnotifierError> {
    let receipt = state.submissions.submit(form).await?;
    Ok(Json(receipt))
}
