//! Client-side view of the session, for apps consuming the accounts API.
//!
//! A [`SessionConsumer`] talks to the backend through a cookie-carrying HTTP
//! client, or to a [`FixtureIdentity`] when running without one.
//!
//! ```rust,ignore
//! use spacewalk_accounts::consumer::{ConsumerConfig, FixtureIdentity, Navigation, SessionConsumer};
//!
//! let config = ConsumerConfig::from_env()?;
//! let mut session = SessionConsumer::from_config(&config, FixtureIdentity::without_character())?;
//!
//! match session.ensure_session().await {
//!     Navigation::Stay => { /* render protected page */ }
//!     Navigation::RedirectToLogin(url) => { /* go to url */ }
//!     Navigation::ShowLogin => { /* render login button */ }
//!     Navigation::ShowError(msg) => { /* render msg */ }
//! }
//! ```

mod character;
mod error;
mod fixtures;
pub mod normalize;

use std::time::Duration;

use reqwest::StatusCode;
use url::Url;

pub use error::{ClientError, Rejection};
pub use fixtures::{DEFAULT_TAKEN_USERNAMES, FixtureIdentity};
pub use normalize::UsernameAvailability;

use crate::character::Character;
use crate::error::Error;
use crate::types::Identity;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const UNREACHABLE_MESSAGE: &str = "Unable to reach the authentication service.";

/// Which backend the consumer talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Fixture identities, no network.
    #[default]
    Development,
    /// The real accounts API.
    Production,
}

impl std::str::FromStr for AppMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(Error::Config(format!(
                "APP_MODE must be development or production, got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerConfig {
    pub mode: AppMode,
    pub api_base_url: Url,
}

impl ConsumerConfig {
    /// Create config from environment variables.
    ///
    /// - `APP_MODE`: `development` (default) or `production`
    /// - `API_BASE_URL`: backend origin (default `http://localhost:3000`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unknown mode or an unparsable URL.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mode = match lookup("APP_MODE") {
            Some(m) => m.parse()?,
            None => AppMode::default(),
        };
        let raw = lookup("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.into());
        let api_base_url =
            Url::parse(&raw).map_err(|e| Error::Config(format!("API_BASE_URL {raw:?}: {e}")))?;
        Ok(Self { mode, api_base_url })
    }
}

/// Outcome of [`SessionConsumer::check_auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    Authenticated(Identity),
    Anonymous,
}

/// What the caller should do after [`SessionConsumer::login`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAction {
    /// Send the browser to this URL to start the Discord flow.
    Navigate(Url),
    /// Already signed in locally.
    SignedIn(Identity),
}

/// Decision for a page that requires a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    RedirectToLogin(Url),
    /// A redirect was already attempted; show a login prompt instead.
    ShowLogin,
    ShowError(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Remote {
    http: reqwest::Client,
    base: Url,
}

impl Remote {
    fn new(mut base: Url) -> Result<Self, ClientError> {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, base })
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    async fn current_identity(&self) -> Result<Option<Identity>, ClientError> {
        let response = self.http.get(self.endpoint("auth/me")?).send().await?;
        match response.status() {
            StatusCode::UNAUTHORIZED => Ok(None),
            s if s.is_success() => normalize::identity(response.json().await?).map(Some),
            s => Err(ClientError::Status { status: s.as_u16() }),
        }
    }

    async fn logout(&self) -> Result<(), ClientError> {
        let response = self.http.post(self.endpoint("auth/logout")?).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ClientError::Status {
                status: response.status().as_u16(),
            })
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Backend {
    Remote(Remote),
    Fixture(FixtureIdentity),
}

/// Local session state plus the backend it is synchronised with.
#[derive(Debug, Clone)]
pub struct SessionConsumer {
    backend: Backend,
    user: Option<Identity>,
    character: Option<Character>,
    redirected: bool,
}

impl SessionConsumer {
    /// Consumer for the accounts API at `api_base_url`.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn remote(api_base_url: Url) -> Result<Self, ClientError> {
        Ok(Self::with_backend(Backend::Remote(Remote::new(api_base_url)?)))
    }

    #[must_use]
    pub fn fixture(fixture: FixtureIdentity) -> Self {
        Self::with_backend(Backend::Fixture(fixture))
    }

    /// Remote in production mode, `fixture` in development mode.
    ///
    /// # Errors
    ///
    /// See [`SessionConsumer::remote`].
    pub fn from_config(config: &ConsumerConfig, fixture: FixtureIdentity) -> Result<Self, ClientError> {
        match config.mode {
            AppMode::Production => Self::remote(config.api_base_url.clone()),
            AppMode::Development => Ok(Self::fixture(fixture)),
        }
    }

    fn with_backend(backend: Backend) -> Self {
        Self {
            backend,
            user: None,
            character: None,
            redirected: false,
        }
    }

    #[must_use]
    pub fn mode(&self) -> AppMode {
        match self.backend {
            Backend::Remote(_) => AppMode::Production,
            Backend::Fixture(_) => AppMode::Development,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn user(&self) -> Option<&Identity> {
        self.user.as_ref()
    }

    /// Character loaded by the last check or create call.
    #[must_use]
    pub fn character(&self) -> Option<&Character> {
        self.character.as_ref()
    }

    /// Ask the backend who the session belongs to.
    ///
    /// A 401 is [`AuthStatus::Anonymous`]; anything else unexpected is an
    /// error. The local identity is cleared unless the check succeeds.
    ///
    /// # Errors
    ///
    /// Transport failures, non-401 error statuses and unreadable bodies.
    pub async fn check_auth(&mut self) -> Result<AuthStatus, ClientError> {
        let result = match &self.backend {
            Backend::Remote(remote) => remote.current_identity().await,
            Backend::Fixture(fixture) => Ok(Some(fixture.identity.clone())),
        };

        match result {
            Ok(Some(identity)) => {
                tracing::debug!(user = %identity.id, "Session is valid");
                self.user = Some(identity.clone());
                self.redirected = false;
                Ok(AuthStatus::Authenticated(identity))
            }
            Ok(None) => {
                self.clear();
                Ok(AuthStatus::Anonymous)
            }
            Err(e) => {
                self.clear();
                Err(e)
            }
        }
    }

    /// Start a login.
    ///
    /// # Errors
    ///
    /// Only if the login URL cannot be built from the base URL.
    pub fn login(&mut self) -> Result<LoginAction, ClientError> {
        match &self.backend {
            Backend::Remote(remote) => Ok(LoginAction::Navigate(remote.endpoint("auth/discord")?)),
            Backend::Fixture(fixture) => {
                let identity = fixture.identity.clone();
                self.user = Some(identity.clone());
                Ok(LoginAction::SignedIn(identity))
            }
        }
    }

    /// End the session. Local state is cleared even if the request fails.
    ///
    /// # Errors
    ///
    /// Transport failures and non-2xx responses from the logout endpoint.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let result = match &self.backend {
            Backend::Remote(remote) => remote.logout().await,
            Backend::Fixture(_) => Ok(()),
        };
        self.clear();
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Logout request failed, local session cleared anyway");
        }
        result
    }

    /// Gate for pages that require a session.
    ///
    /// Redirects to login at most once until a check succeeds again, so a
    /// backend that keeps answering 401 cannot cause a redirect loop.
    pub async fn ensure_session(&mut self) -> Navigation {
        match self.check_auth().await {
            Ok(AuthStatus::Authenticated(_)) => Navigation::Stay,
            Ok(AuthStatus::Anonymous) => {
                let Backend::Remote(remote) = &self.backend else {
                    return Navigation::ShowLogin;
                };
                if self.redirected {
                    return Navigation::ShowLogin;
                }
                match remote.endpoint("auth/discord") {
                    Ok(url) => {
                        self.redirected = true;
                        Navigation::RedirectToLogin(url)
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Cannot build login URL");
                        Navigation::ShowError(UNREACHABLE_MESSAGE.into())
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session check failed");
                Navigation::ShowError(UNREACHABLE_MESSAGE.into())
            }
        }
    }

    fn clear(&mut self) {
        self.user = None;
        self.character = None;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn config_defaults() {
        let config = ConsumerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.mode, AppMode::Development);
        assert_eq!(config.api_base_url.as_str(), "http://localhost:3000/");
    }

    #[test]
    fn config_production() {
        let config = ConsumerConfig::from_lookup(lookup(&[
            ("APP_MODE", "Production"),
            ("API_BASE_URL", "https://api.spacewalk.my.id"),
        ]))
        .unwrap();
        assert_eq!(config.mode, AppMode::Production);
        assert_eq!(config.api_base_url.host_str(), Some("api.spacewalk.my.id"));
    }

    #[test]
    fn config_rejects_unknown_mode() {
        assert!(ConsumerConfig::from_lookup(lookup(&[("APP_MODE", "staging")])).is_err());
        assert!(ConsumerConfig::from_lookup(lookup(&[("API_BASE_URL", "not a url")])).is_err());
    }

    #[test]
    fn endpoints_keep_base_path() {
        let remote = Remote::new(Url::parse("https://spacewalk.my.id/api").unwrap()).unwrap();
        assert_eq!(
            remote.endpoint("auth/me").unwrap().as_str(),
            "https://spacewalk.my.id/api/auth/me"
        );
    }

    #[tokio::test]
    async fn fixture_session_lifecycle() {
        let mut session = SessionConsumer::fixture(FixtureIdentity::without_character());
        assert_eq!(session.mode(), AppMode::Development);
        assert!(!session.is_authenticated());

        assert!(matches!(session.check_auth().await, Ok(AuthStatus::Authenticated(_))));
        assert_eq!(session.user().map(|u| u.username.as_str()), Some("newuser"));
        assert_eq!(session.ensure_session().await, Navigation::Stay);

        session.logout().await.unwrap();
        assert!(!session.is_authenticated());

        match session.login().unwrap() {
            LoginAction::SignedIn(identity) => assert_eq!(identity.username, "newuser"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(session.is_authenticated());
    }

    #[test]
    fn remote_login_navigates() {
        let mut session =
            SessionConsumer::remote(Url::parse("http://localhost:3000").unwrap()).unwrap();
        assert_eq!(session.mode(), AppMode::Production);
        assert_eq!(
            session.login().unwrap(),
            LoginAction::Navigate(Url::parse("http://localhost:3000/auth/discord").unwrap())
        );
        assert!(!session.is_authenticated());
    }

    #[test]
    fn from_config_picks_backend() {
        let dev = ConsumerConfig::from_lookup(lookup(&[])).unwrap();
        let session = SessionConsumer::from_config(&dev, FixtureIdentity::another_user()).unwrap();
        assert_eq!(session.mode(), AppMode::Development);

        let prod = ConsumerConfig::from_lookup(lookup(&[("APP_MODE", "production")])).unwrap();
        let session = SessionConsumer::from_config(&prod, FixtureIdentity::another_user()).unwrap();
        assert_eq!(session.mode(), AppMode::Production);
    }
}
