use crate::config::{AuthStrategy, SheetsConfig};
use crate::error::{FnotifierError, OauthError};
use crate::sheets::client::SheetsClient;
use crate::sheets::endpoints::SheetsOauthEndpoints;
use crate::sheets::gate::ReadinessGate;
use crate::sheets::secret::OauthClientSecret;
use crate::sheets::token::{StoredToken, TokenFile};
use oauth2::{AuthorizationCode, PkceCodeChallenge, PkceCodeVerifier};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use url::Url;

/// One issued authorization URL and the secrets needed to redeem its code.
struct PendingSession {
    auth_url: Url,
    state: String,
    pkce_verifier: String,
}

struct AuthorizerInner {
    cfg: SheetsConfig,
    endpoints: Arc<SheetsOauthEndpoints>,
    token_file: TokenFile,
    gate: ReadinessGate,
    session: Mutex<Option<PendingSession>>,
}

/// Drives the spreadsheet client from `Unauthorized` through `Authorizing` to `Ready`.
///
/// A saved token is always tried first. Without one, the configured [`AuthStrategy`]
/// decides how the authorization code reaches [`SheetsAuthorizer`].
#[derive(Clone)]
pub struct SheetsAuthorizer {
    inner: Arc<AuthorizerInner>,
}

impl SheetsAuthorizer {
    pub fn new(
        secret: &OauthClientSecret,
        cfg: &SheetsConfig,
        gate: ReadinessGate,
    ) -> Result<Self, FnotifierError> {
        let endpoints = SheetsOauthEndpoints::new(secret, cfg.redirect_url.as_ref())?;
        Ok(Self {
            inner: Arc::new(AuthorizerInner {
                cfg: cfg.clone(),
                endpoints: Arc::new(endpoints),
                token_file: TokenFile::new(&cfg.token_path),
                gate,
                session: Mutex::new(None),
            }),
        })
    }

    /// Reads the client secret file named in `cfg`.
    pub fn from_config(cfg: &SheetsConfig, gate: ReadinessGate) -> Result<Self, FnotifierError> {
        let secret = OauthClientSecret::from_file(&cfg.client_secret_path)?;
        Self::new(&secret, cfg, gate)
    }

    pub fn strategy(&self) -> AuthStrategy {
        self.inner.cfg.auth_strategy
    }

    /// Restore a saved token or begin interactive authorization.
    ///
    /// Fails only for [`AuthStrategy::SavedToken`] without a usable token file.
    pub async fn start(&self) -> Result<(), FnotifierError> {
        if self.restore_saved().await? {
            return Ok(());
        }
        match self.strategy() {
            AuthStrategy::SavedToken => Err(FnotifierError::Config(format!(
                "no usable OAuth token at {}",
                self.inner.token_file.path().display()
            ))),
            AuthStrategy::Console => {
                self.begin().await?;
                let authorizer = self.clone();
                tokio::spawn(async move { authorizer.read_console_codes().await });
                Ok(())
            }
            AuthStrategy::Callback => {
                self.begin().await?;
                info!("Waiting for the OAuth callback to deliver an authorization code");
                Ok(())
            }
        }
    }

    /// Publish a client built from the token file. Returns `false` if there is no usable token.
    pub async fn restore_saved(&self) -> Result<bool, FnotifierError> {
        if self.inner.gate.snapshot().await.is_ready() {
            return Ok(true);
        }
        let Some(token) = self.inner.token_file.load().await else {
            return Ok(false);
        };
        if !token.is_usable() {
            warn!(
                path = %self.inner.token_file.path().display(),
                "Saved token is expired and has no refresh token; re-authorization required"
            );
            return Ok(false);
        }
        self.publish(token).await?;
        info!(
            path = %self.inner.token_file.path().display(),
            "Spreadsheet client restored from saved token"
        );
        Ok(true)
    }

    /// Issue (or re-issue) the authorization URL and print it for the operator.
    pub async fn begin(&self) -> Result<Url, FnotifierError> {
        if self.inner.gate.snapshot().await.is_ready() {
            return Err(FnotifierError::AlreadyAuthorized);
        }

        let mut session = self.inner.session.lock().await;
        if let Some(pending) = session.as_ref() {
            return Ok(pending.auth_url.clone());
        }

        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf_token) = self.inner.endpoints.build_authorize_url(challenge);
        self.inner.gate.mark_authorizing().await?;

        *session = Some(PendingSession {
            auth_url: auth_url.clone(),
            state: csrf_token.secret().to_string(),
            pkce_verifier: verifier.secret().to_string(),
        });

        match self.strategy() {
            AuthStrategy::Console => println!(
                "Go to the following link in your browser then type the authorization code:\n{auth_url}"
            ),
            _ => println!(
                "Go to the following link in your browser to authorize spreadsheet access:\n{auth_url}"
            ),
        }
        info!("Spreadsheet authorization URL issued");
        Ok(auth_url)
    }

    /// Redeem a code delivered to `GET /callback`. `state` must echo the issued one.
    pub async fn complete_callback(&self, code: &str, state: &str) -> Result<(), FnotifierError> {
        self.redeem(code, Some(state)).await
    }

    /// Redeem a code pasted by the operator; the console carries no `state`.
    pub async fn complete_console(&self, code: &str) -> Result<(), FnotifierError> {
        self.redeem(code, None).await
    }

    async fn redeem(&self, code: &str, state: Option<&str>) -> Result<(), FnotifierError> {
        if self.inner.gate.snapshot().await.is_ready() {
            return Err(FnotifierError::AlreadyAuthorized);
        }

        let pending = self.inner.session.lock().await.take().ok_or_else(|| {
            OauthError::flow(
                "OAUTH_SESSION_MISSING",
                "No authorization is pending; open the authorization URL first",
            )
        })?;

        if let Some(state) = state
            && state != pending.state
        {
            self.restore_session(pending).await;
            return Err(OauthError::flow("STATE_MISMATCH", "OAuth state mismatch").into());
        }

        let exchanged = self
            .inner
            .endpoints
            .exchange_authorization_code(
                AuthorizationCode::new(code.to_string()),
                PkceCodeVerifier::new(pending.pkce_verifier.clone()),
            )
            .await;

        let token_response = match exchanged {
            Ok(resp) => resp,
            Err(e) => {
                self.restore_session(pending).await;
                return Err(e.into());
            }
        };

        let token = StoredToken::from_response(&token_response, None);
        if token.refresh_token.is_none() {
            warn!("Token response carried no refresh token; re-authorization will be needed after expiry");
        }
        if let Err(e) = self.inner.token_file.save(&token).await {
            error!(error = %e, "Unable to cache OAuth token; continuing with in-memory token");
        }
        self.publish(token).await?;
        info!("Spreadsheet client authorized");
        Ok(())
    }

    async fn restore_session(&self, pending: PendingSession) {
        let mut session = self.inner.session.lock().await;
        if session.is_none() {
            *session = Some(pending);
        }
    }

    async fn publish(&self, token: StoredToken) -> Result<(), FnotifierError> {
        let client = SheetsClient::new(
            &self.inner.cfg,
            token,
            self.inner.endpoints.clone(),
            self.inner.token_file.clone(),
        )?;
        self.inner.gate.publish(Arc::new(client)).await
    }

    async fn read_console_codes(self) {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    warn!("stdin closed before an authorization code was entered");
                    return;
                }
                Err(e) => {
                    error!(error = %e, "Unable to read authorization code");
                    return;
                }
            };
            let code = line.trim();
            if code.is_empty() {
                continue;
            }
            match self.complete_console(code).await {
                Ok(()) | Err(FnotifierError::AlreadyAuthorized) => return,
                Err(e) => {
                    warn!(error = %e, "Authorization code was rejected; paste a new code");
                }
            }
        }
    }
}
