#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use fnotifier::FnotifierError;
use fnotifier::config::SheetsConfig;
use fnotifier::db::{DbActorHandle, SubmissionCreate};
use fnotifier::service::submission::{Notifier, RowAppender, SubmissionService, SubmissionStore};
use fnotifier::sheets::{OauthClientSecret, ReadinessGate, SheetsAuthorizer};
use fnotifier::telegram::{AdminChat, AdminChatRecorder, ChatId, admin_chat_channel};
use fnotifier::{FnotifierState, fnotifier_router};
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{SystemTime, UNIX_EPOCH},
};
use tokio::net::TcpListener;
use url::Url;

pub fn unique_temp_path(prefix: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "fnotifier-{prefix}-{}-{}.{ext}",
        std::process::id(),
        nanos
    ));
    temp_path
}

pub fn sqlite_url(path: &std::path::Path) -> String {
    format!("sqlite:{}", path.display())
}

pub async fn spawn_test_server(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let base = Url::parse(&format!("http://{}/", addr)).expect("valid base url");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    base
}

/// Client secret whose token endpoint lives under `token_base`.
pub fn client_secret(token_base: &Url) -> OauthClientSecret {
    let raw = format!(
        r#"{{"web":{{
            "client_id":"cid.apps.googleusercontent.com",
            "client_secret":"shh",
            "auth_uri":"https://accounts.google.com/o/oauth2/auth",
            "token_uri":"{}",
            "redirect_uris":["http://localhost:8080/callback"]
        }}}}"#,
        token_base.join("token").expect("token url")
    );
    OauthClientSecret::from_json(raw.as_bytes()).expect("valid client secret")
}

pub fn sheets_config(sheets_base: &Url, token_path: PathBuf) -> SheetsConfig {
    SheetsConfig {
        spreadsheet_id: "sheet-123".to_string(),
        token_path,
        api_base_url: sheets_base.clone(),
        retry_max_times: 1,
        ..SheetsConfig::default()
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(ChatId, String)>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().expect("notifier lock").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, chat_id: ChatId, text: &str) -> Result<(), FnotifierError> {
        self.sent
            .lock()
            .expect("notifier lock")
            .push((chat_id, text.to_string()));
        if self.fail {
            return Err(FnotifierError::Telegram("chat not found".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingAppender {
    pub rows: Mutex<Vec<Vec<String>>>,
    pub fail: bool,
}

impl RecordingAppender {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().expect("appender lock").clone()
    }
}

#[async_trait]
impl RowAppender for RecordingAppender {
    async fn append_row(&self, row: Vec<String>) -> Result<(), FnotifierError> {
        self.rows.lock().expect("appender lock").push(row);
        if self.fail {
            return Err(FnotifierError::UpstreamStatus(
                axum::http::StatusCode::FORBIDDEN,
            ));
        }
        Ok(())
    }
}

pub struct FailingStore;

#[async_trait]
impl SubmissionStore for FailingStore {
    async fn insert_submission(&self, _create: SubmissionCreate) -> Result<i64, FnotifierError> {
        Err(FnotifierError::UnexpectedError("disk full".to_string()))
    }
}

/// Router wired to in-process fakes. The returned recorder controls the admin chat.
pub struct TestApp {
    pub router: Router,
    pub gate: ReadinessGate,
    pub recorder: AdminChatRecorder,
    pub admin_chat: AdminChat,
}

pub fn build_app(
    store: Arc<dyn SubmissionStore>,
    notifier: Arc<dyn Notifier>,
    admin_chat_id: Option<ChatId>,
    authorizer_cfg: &SheetsConfig,
    secret: &OauthClientSecret,
) -> TestApp {
    let gate = ReadinessGate::new();
    let (recorder, admin_chat) = admin_chat_channel(admin_chat_id);
    let authorizer =
        SheetsAuthorizer::new(secret, authorizer_cfg, gate.clone()).expect("authorizer");
    let submissions = SubmissionService::new(store, notifier, admin_chat.clone(), gate.clone());
    let state = FnotifierState::new(submissions, gate.clone(), authorizer, admin_chat.clone());
    TestApp {
        router: fnotifier_router(state),
        gate,
        recorder,
        admin_chat,
    }
}

/// `build_app` against a fresh sqlite file and placeholder OAuth endpoints.
pub async fn build_db_app(
    prefix: &str,
    notifier: Arc<dyn Notifier>,
    admin_chat_id: Option<ChatId>,
) -> (TestApp, DbActorHandle, PathBuf) {
    let db_path = unique_temp_path(prefix, "sqlite");
    let db = fnotifier::db::spawn(&sqlite_url(&db_path))
        .await
        .expect("spawn db actor");
    let unreachable = Url::parse("http://127.0.0.1:9/").expect("url");
    let cfg = sheets_config(&unreachable, unique_temp_path(prefix, "token.json"));
    let app = build_app(
        Arc::new(db.clone()),
        notifier,
        admin_chat_id,
        &cfg,
        &client_secret(&unreachable),
    );
    (app, db, db_path)
}
