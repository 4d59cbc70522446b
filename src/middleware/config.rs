use std::sync::Arc;
use std::time::Duration as StdDuration;

use time::Duration;
use url::Url;

use super::cookies::CookiePolicy;
use super::error::AuthError;
use super::traits::IdentityProvider;
use crate::oauth::{DiscordClient, OAuthConfig};
use crate::token::SessionSigner;

const DEFAULT_APP_HOME: &str = "https://spacewalk.my.id/";

/// Shared auth settings used by both config and runtime state.
#[derive(Clone)]
pub(crate) struct AuthSettings {
    pub(crate) signer: Arc<SessionSigner>,
    pub(crate) cookie: CookiePolicy,
    pub(crate) auth_path: String,
    pub(crate) login_redirect: String,
}

impl AuthSettings {
    fn new(signer: SessionSigner) -> Self {
        Self {
            signer: Arc::new(signer),
            cookie: CookiePolicy::default(),
            auth_path: "/auth".into(),
            login_redirect: DEFAULT_APP_HOME.into(),
        }
    }
}

/// Session authentication configuration.
///
/// The identity provider and signing key are constructor parameters.
///
/// Use [`from_env()`](SessionAuthConfig::from_env) for convention-based setup,
/// or [`new()`](SessionAuthConfig::new) with `with_*` methods for full control.
pub struct SessionAuthConfig<P = DiscordClient> {
    pub(super) provider: P,
    pub(super) settings: AuthSettings,
}

impl<P: IdentityProvider> SessionAuthConfig<P> {
    /// Create config with the required provider and signer.
    ///
    /// All optional fields use the production defaults. Override with `with_*` methods.
    #[must_use]
    pub fn new(provider: P, signer: SessionSigner) -> Self {
        Self {
            provider,
            settings: AuthSettings::new(signer),
        }
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.cookie.set_name(name.into());
        self
    }

    /// Domain attribute of the session cookie (default `.spacewalk.my.id`).
    #[must_use]
    pub fn with_cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.settings.cookie.set_domain(domain.into());
        self
    }

    /// Lifetime of the credential and of its cookie (default 7 days).
    ///
    /// Values below one day are raised to one day.
    #[must_use]
    pub fn with_session_ttl_days(mut self, days: i64) -> Self {
        if days < 1 {
            tracing::warn!(days, "Session TTL below one day, using one day");
        }
        self.settings.cookie.set_ttl(Duration::days(days.max(1)));
        self
    }

    /// Prefix of the auth routes (default `/auth`).
    #[must_use]
    pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
        self.settings.auth_path = path.into();
        self
    }

    /// Where the browser lands after a successful login.
    #[must_use]
    pub fn with_login_redirect(mut self, url: impl Into<String>) -> Self {
        self.settings.login_redirect = url.into();
        self
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl SessionAuthConfig<DiscordClient> {
    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `CLIENT_ID`: Discord application client ID
    /// - `CLIENT_SECRET`: Discord application client secret
    /// - `REDIRECT_URI`: OAuth2 callback URI (must be a valid URL)
    /// - `JWT_SECRET`: session signing secret (at least 32 bytes)
    ///
    /// # Optional env vars
    /// - `COOKIE_DOMAIN`: session cookie domain (default `.spacewalk.my.id`)
    /// - `SESSION_TTL_DAYS`: credential lifetime in days (default `7`)
    /// - `APP_HOME_URL`: post-login redirect (default `https://spacewalk.my.id/`)
    /// - `DISCORD_SCOPES`: comma-separated OAuth2 scopes
    /// - `DISCORD_TIMEOUT_SECS`: per-request timeout for Discord calls (default `5`)
    /// - `DISCORD_API_URL`: override the Discord API base
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if required env vars are missing or values are invalid.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AuthError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AuthError::Config(format!("{key} is required")))
        };

        let client_id = required("CLIENT_ID")?;
        let client_secret = required("CLIENT_SECRET")?;
        let redirect_uri: Url = required("REDIRECT_URI")?
            .parse()
            .map_err(|e| AuthError::Config(format!("REDIRECT_URI: {e}")))?;
        let signer = SessionSigner::new(required("JWT_SECRET")?)
            .map_err(|e| AuthError::Config(format!("JWT_SECRET: {e}")))?;

        let mut oauth = OAuthConfig::new(client_id, client_secret, redirect_uri);

        if let Some(url_str) = lookup("DISCORD_API_URL") {
            let base: Url = url_str
                .parse()
                .map_err(|e| AuthError::Config(format!("DISCORD_API_URL: {e}")))?;
            oauth = oauth
                .with_api_base(&base)
                .map_err(|e| AuthError::Config(e.to_string()))?;
        }
        if let Some(scopes) = lookup("DISCORD_SCOPES") {
            oauth = oauth.with_scopes(scopes.split(',').map(|s| s.trim().to_string()).collect());
        }
        if let Some(secs) = lookup("DISCORD_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|e| AuthError::Config(format!("DISCORD_TIMEOUT_SECS: {e}")))?;
            oauth = oauth.with_timeout(StdDuration::from_secs(secs));
        }

        let mut config = Self::new(DiscordClient::new(oauth), signer);

        if let Some(domain) = lookup("COOKIE_DOMAIN") {
            config = config.with_cookie_domain(domain);
        }
        if let Some(days) = lookup("SESSION_TTL_DAYS") {
            let days: i64 = days
                .parse()
                .map_err(|e| AuthError::Config(format!("SESSION_TTL_DAYS: {e}")))?;
            if days < 1 {
                return Err(AuthError::Config("SESSION_TTL_DAYS must be at least 1".into()));
            }
            config = config.with_session_ttl_days(days);
        }
        if let Some(home) = lookup("APP_HOME_URL") {
            config = config.with_login_redirect(home);
        }

        Ok(config)
    }
}
