use std::future::Future;

use crate::error::Error;
use crate::oauth::{DiscordClient, TokenResponse};
use crate::types::DiscordUser;

/// OAuth2 identity provider used by the login routes.
///
/// [`DiscordClient`] is the production implementation. The two async calls are
/// made strictly in sequence by the callback handler: the profile fetch needs
/// the access token from the exchange.
///
/// # Example
///
/// ```rust,ignore
/// impl IdentityProvider for StubProvider {
///     fn authorization_url(&self) -> String {
///         "https://id.example.com/authorize".into()
///     }
///
///     async fn exchange_code(&self, code: &str) -> Result<TokenResponse, Error> {
///         Ok(TokenResponse::bearer(format!("token-for-{code}")))
///     }
///
///     async fn fetch_user(&self, access_token: &str) -> Result<DiscordUser, Error> {
///         Ok(DiscordUser::new("42".parse()?, "nova"))
///     }
/// }
/// ```
pub trait IdentityProvider: Send + Sync + 'static {
    /// Authorize URL the browser is sent to by the login route.
    fn authorization_url(&self) -> String;

    /// Exchange a single-use authorization code for an access token.
    fn exchange_code(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<TokenResponse, Error>> + Send;

    /// Fetch the profile of the user the access token belongs to.
    fn fetch_user(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<DiscordUser, Error>> + Send;
}

impl IdentityProvider for DiscordClient {
    fn authorization_url(&self) -> String {
        DiscordClient::authorization_url(self)
    }

    fn exchange_code(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<TokenResponse, Error>> + Send {
        DiscordClient::exchange_code(self, code)
    }

    fn fetch_user(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<DiscordUser, Error>> + Send {
        self.get_user(access_token)
    }
}
