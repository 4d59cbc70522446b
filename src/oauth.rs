use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::Error;
use crate::types::DiscordUser;

const DEFAULT_AUTH_URL: &str = "https://discord.com/oauth2/authorize";
const DEFAULT_API_BASE: &str = "https://discord.com/api/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Discord `OAuth2` configuration.
///
/// Client id, secret and redirect URI are constructor parameters; everything else has a Discord default.
///
/// ```rust,ignore
/// use spacewalk_accounts::OAuthConfig;
///
/// let config = OAuthConfig::new("client-id", "client-secret", "https://api.example.com/auth/discord/callback".parse()?)
///     .with_scopes(vec!["identify".into(), "email".into()]);
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct OAuthConfig {
    pub(crate) client_id: String,
    pub(crate) client_secret: String,
    pub(crate) auth_url: Url,
    pub(crate) token_url: Url,
    pub(crate) user_url: Url,
    pub(crate) redirect_uri: Url,
    pub(crate) scopes: Vec<String>,
    pub(crate) timeout: Duration,
}

impl OAuthConfig {
    /// Create a new Discord `OAuth2` configuration.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: Url,
    ) -> Self {
        let api_base = Url::parse(DEFAULT_API_BASE).expect("valid default URL");
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri,
            auth_url: DEFAULT_AUTH_URL.parse().expect("valid default URL"),
            token_url: api_base.join("oauth2/token").expect("valid default URL"),
            user_url: api_base.join("users/@me").expect("valid default URL"),
            scopes: vec!["identify".into(), "email".into(), "guilds".into()],
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the authorization endpoint.
    #[must_use]
    pub fn with_auth_url(mut self, url: Url) -> Self {
        self.auth_url = url;
        self
    }

    /// Override the token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: Url) -> Self {
        self.token_url = url;
        self
    }

    /// Override the current-user endpoint.
    #[must_use]
    pub fn with_user_url(mut self, url: Url) -> Self {
        self.user_url = url;
        self
    }

    /// Point token and user endpoints at another API base (staging, test doubles).
    ///
    /// The base must end with `/` for the relative endpoints to resolve under it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the endpoints cannot be joined onto `base`.
    pub fn with_api_base(mut self, base: &Url) -> Result<Self, Error> {
        let join = |path: &str| {
            base.join(path)
                .map_err(|e| Error::Config(format!("API base {base}: {e}")))
        };
        self.token_url = join("oauth2/token")?;
        self.user_url = join("users/@me")?;
        Ok(self)
    }

    /// Override the requested scopes (default: `identify email guilds`).
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Upper bound for each outbound request (default: 5 seconds).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    #[must_use]
    pub fn user_url(&self) -> &Url {
        &self.user_url
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// `OAuth2` client for Discord.
pub struct DiscordClient {
    config: OAuthConfig,
    http: reqwest::Client,
}

/// Token response from the Discord token endpoint.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    #[must_use]
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".into(),
            expires_in: None,
            refresh_token: None,
            scope: None,
        }
    }
}

impl DiscordClient {
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Build the authorize URL the browser is redirected to.
    #[must_use]
    pub fn authorization_url(&self) -> String {
        let scope = self.config.scopes.join(" ");

        let mut url = self.config.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", self.config.redirect_uri.as_str())
            .append_pair("scope", &scope);

        url.into()
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure or timeout, or
    /// [`Error::OAuth`] if the token endpoint returns an error.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, Error> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self
            .http
            .post(self.config.token_url.clone())
            .timeout(self.config.timeout)
            .form(&params)
            .send()
            .await?;

        let response = Self::ensure_success(response, "token exchange").await?;
        response.json::<TokenResponse>().await.map_err(Into::into)
    }

    /// Fetch the current user with an access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure or timeout, or
    /// [`Error::OAuth`] if the user endpoint returns an error.
    pub async fn get_user(&self, access_token: &str) -> Result<DiscordUser, Error> {
        let response = self
            .http
            .get(self.config.user_url.clone())
            .timeout(self.config.timeout)
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = Self::ensure_success(response, "user request").await?;
        response.json::<DiscordUser>().await.map_err(Into::into)
    }

    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(Error::OAuth {
            operation,
            status: Some(status),
            detail: body,
        })
    }
}
