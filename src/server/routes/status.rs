use crate::server::router::FnotifierState;
use crate::sheets::AuthPhase;
use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Serialize)]
pub struct SheetsStatus {
    pub ready: bool,
    pub state: AuthPhase,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub sheets: SheetsStatus,
    pub admin_chat: bool,
}

/// GET /
pub async fn liveness() -> Json<Value> {
    Json(json!({ "Update": "working" }))
}

/// GET /status
pub async fn status(State(state): State<FnotifierState>) -> Json<StatusResponse> {
    let snapshot = state.gate.snapshot().await;
    Json(StatusResponse {
        sheets: SheetsStatus {
            ready: snapshot.is_ready(),
            state: snapshot.phase,
        },
        admin_chat: state.admin_chat.current().is_some(),
    })
}
