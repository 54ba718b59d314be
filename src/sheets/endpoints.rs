use crate::error::{FnotifierError, OauthError};
use crate::sheets::secret::OauthClientSecret;
use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::{
    AuthUrl, AuthorizationCode, Client as OAuth2Client, ClientId, ClientSecret, CsrfToken,
    EmptyExtraTokenFields, EndpointNotSet, EndpointSet, PkceCodeChallenge, PkceCodeVerifier,
    RedirectUrl, RefreshToken, Scope, StandardRevocableToken, StandardTokenResponse, TokenUrl,
};
use std::time::Duration;
use tracing::info;
use url::Url;

/// Read/write access to spreadsheets; nothing else is requested.
pub(crate) const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

pub(crate) type OauthTokenResponse = StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>;

pub(crate) type SheetsOauth2Client<
    HasAuthUrl = EndpointSet,
    HasDeviceAuthUrl = EndpointNotSet,
    HasIntrospectionUrl = EndpointNotSet,
    HasRevocationUrl = EndpointNotSet,
    HasTokenUrl = EndpointSet,
> = OAuth2Client<
    BasicErrorResponse,
    OauthTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    HasAuthUrl,
    HasDeviceAuthUrl,
    HasIntrospectionUrl,
    HasRevocationUrl,
    HasTokenUrl,
>;

/// Google OAuth endpoints bound to one client registration.
pub(crate) struct SheetsOauthEndpoints {
    client: SheetsOauth2Client,
    http: reqwest::Client,
}

impl SheetsOauthEndpoints {
    /// The redirect URL is `redirect_override` when set, otherwise the first redirect URI
    /// registered in the client secret.
    pub(crate) fn new(
        secret: &OauthClientSecret,
        redirect_override: Option<&Url>,
    ) -> Result<Self, FnotifierError> {
        let redirect = match redirect_override {
            Some(url) => url.as_str().to_string(),
            None => secret.redirect_uris.first().cloned().ok_or_else(|| {
                FnotifierError::Config(
                    "client secret has no redirect_uris and sheets.redirect_url is unset"
                        .to_string(),
                )
            })?,
        };

        let mut client = OAuth2Client::<
            BasicErrorResponse,
            OauthTokenResponse,
            BasicTokenIntrospectionResponse,
            StandardRevocableToken,
            BasicRevocationErrorResponse,
        >::new(ClientId::new(secret.client_id.clone()));

        if let Some(client_secret) = secret.client_secret.as_ref() {
            client = client.set_client_secret(ClientSecret::new(client_secret.clone()));
        }

        let client = client
            .set_auth_uri(AuthUrl::new(secret.auth_uri.clone())?)
            .set_token_uri(TokenUrl::new(secret.token_uri.clone())?)
            .set_redirect_uri(RedirectUrl::new(redirect)?);

        // Token endpoints must not follow redirects (oauth2 SSRF guidance).
        let http = reqwest::Client::builder()
            .user_agent(concat!("fnotifier-oauth/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self { client, http })
    }

    /// Build an offline-access consent URL with a PKCE challenge and random `state`.
    pub(crate) fn build_authorize_url(&self, pkce_challenge: PkceCodeChallenge) -> (Url, CsrfToken) {
        self.client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge)
            .add_scope(Scope::new(SPREADSHEETS_SCOPE.to_string()))
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .url()
    }

    pub(crate) async fn exchange_authorization_code(
        &self,
        code: AuthorizationCode,
        verifier: PkceCodeVerifier,
    ) -> Result<OauthTokenResponse, OauthError> {
        let token_result: OauthTokenResponse = self
            .client
            .exchange_code(code)
            .set_pkce_verifier(verifier)
            .request_async(&self.http)
            .await?;
        info!("Sheets OAuth2 code exchange completed successfully");
        Ok(token_result)
    }

    pub(crate) async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<OauthTokenResponse, OauthError> {
        let token_result: OauthTokenResponse = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&self.http)
            .await?;
        info!("Sheets OAuth2 access token refreshed");
        Ok(token_result)
    }
}
