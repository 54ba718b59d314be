use crate::server::routes::{form, oauth, status};
use crate::service::submission::SubmissionService;
use crate::sheets::{ReadinessGate, SheetsAuthorizer};
use crate::telegram::AdminChat;

use axum::{
    Router,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use base64::Engine as _;
use rand::RngCore;
use std::time::Instant;
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// 12 random bytes, base64url without padding.
fn new_request_id() -> String {
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Reuse the caller's `x-request-id` when it is printable and reasonably short.
fn request_id_of(req: &Request) -> String {
    req.headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(new_request_id, str::to_string)
}

#[derive(Clone)]
pub struct FnotifierState {
    pub submissions: SubmissionService,
    pub gate: ReadinessGate,
    pub authorizer: SheetsAuthorizer,
    pub admin_chat: AdminChat,
}

impl FnotifierState {
    pub fn new(
        submissions: SubmissionService,
        gate: ReadinessGate,
        authorizer: SheetsAuthorizer,
        admin_chat: AdminChat,
    ) -> Self {
        Self {
            submissions,
            gate,
            authorizer,
            admin_chat,
        }
    }
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn access_log(req: Request, next: Next) -> Response {
    let request_id = request_id_of(&req);
    let method = req.method().clone();
    let version = req.version();
    // Path only: the query of `/callback` carries the authorization code.
    let path = req.uri().path().to_string();
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status().as_u16();
    macro_rules! access {
        ($level:ident) => {
            $level!(
                status,
                %request_id,
                %method,
                ?version,
                %path,
                latency_ms,
                %user_agent,
                "request served"
            )
        };
    }
    if resp.status().is_server_error() {
        access!(error);
    } else if resp.status().is_client_error() {
        access!(warn);
    } else {
        access!(info);
    }

    resp
}

pub fn fnotifier_router(state: FnotifierState) -> Router {
    let oauth = Router::new()
        .route("/callback", get(oauth::sheets_oauth_callback))
        .route("/sheets/auth", get(oauth::sheets_oauth_entry));

    Router::new()
        .route("/", get(status::liveness))
        .route("/status", get(status::status))
        .route("/SendForm", post(form::send_form))
        .merge(oauth)
        .fallback(not_found_handler)
        .with_state(state)
        .layer(middleware::from_fn(access_log))
}
