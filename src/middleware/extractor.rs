use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use super::config::AuthSettings;
use super::cookies::{self, SESSION_COOKIE_NAME};
use super::error::AuthError;
use crate::token::SessionSigner;
use crate::types::Identity;

/// Verifies the cookie-borne session credential.
///
/// Holds no state besides the process-wide signing key, so verification never
/// touches storage. Extractable from any router state that implements
/// `FromRef<S> for SessionVerifier`.
#[derive(Debug, Clone)]
pub struct SessionVerifier {
    signer: Arc<SessionSigner>,
    cookie_name: String,
}

impl SessionVerifier {
    #[must_use]
    pub fn new(signer: Arc<SessionSigner>) -> Self {
        Self {
            signer,
            cookie_name: SESSION_COOKIE_NAME.into(),
        }
    }

    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub(super) fn from_settings(settings: &AuthSettings) -> Self {
        Self {
            signer: settings.signer.clone(),
            cookie_name: settings.cookie.name().to_owned(),
        }
    }
}

/// Identity of the authenticated caller, decoded from the session cookie.
///
/// Use as an Axum extractor in route handlers. Rejects with `401` and
/// `NO_TOKEN` when the cookie is absent, or `INVALID_TOKEN` when it fails
/// signature or expiry checks.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected(AuthIdentity { user, .. }: AuthIdentity) -> impl IntoResponse {
///     format!("Hello, {}", user.display_name())
/// }
///
/// // Optional: a missing or invalid session yields `None`
/// async fn public(user: Option<AuthIdentity>) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Hello, {}", u.user.username),
///         None => "Hello, guest".to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthIdentity {
    pub user: Identity,
    /// Email captured at login, if Discord shared it.
    pub email: Option<String>,
    /// Credential expiry (Unix seconds).
    pub expires_at: u64,
}

impl<S> FromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
    SessionVerifier: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let verifier = SessionVerifier::from_ref(state);
        resolve_session(&verifier, &jar)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
    SessionVerifier: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let verifier = SessionVerifier::from_ref(state);
        match resolve_session(&verifier, &jar) {
            Ok(auth) => Ok(Some(auth)),
            Err(AuthError::InvalidToken(reason)) => {
                tracing::debug!(reason = %reason, "Ignoring invalid session on optional route");
                Ok(None)
            }
            Err(_) => Ok(None),
        }
    }
}

/// Resolve the session carried by `jar`.
///
/// For custom middleware that needs the identity outside an extractor.
///
/// # Errors
///
/// [`AuthError::NoToken`] when the cookie is absent or empty,
/// [`AuthError::InvalidToken`] when verification fails.
pub fn resolve_session(verifier: &SessionVerifier, jar: &CookieJar) -> Result<AuthIdentity, AuthError> {
    let token = cookies::session_token(jar, &verifier.cookie_name).ok_or(AuthError::NoToken)?;
    let claims = verifier.signer.verify(token)?;

    Ok(AuthIdentity {
        user: claims.identity(),
        email: claims.email,
        expires_at: claims.exp,
    })
}
