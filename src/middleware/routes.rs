use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderName, StatusCode, header::LOCATION};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::config::SessionAuthConfig;
use super::error::AuthError;
use super::extractor::AuthIdentity;
use super::state::AuthState;
use super::traits::IdentityProvider;
use super::types::{MeResponse, SuccessResponse};

/// Create the session authentication router.
///
/// Routes, relative to the configured auth path (default `/auth`):
/// `GET /discord`, `GET /discord/callback`, `GET /me`, `POST /logout`.
pub fn auth_routes<P: IdentityProvider>(config: SessionAuthConfig<P>) -> Router {
    let auth_path = config.settings.auth_path.clone();

    let state = AuthState {
        provider: Arc::new(config.provider),
        settings: config.settings,
    };

    Router::new()
        .route(&format!("{auth_path}/discord"), get(login::<P>))
        .route(&format!("{auth_path}/discord/callback"), get(callback::<P>))
        .route(&format!("{auth_path}/me"), get(me))
        .route(&format!("{auth_path}/logout"), post(logout::<P>))
        .with_state(state)
}

// ── Login ──────────────────────────────────────────────────────────

async fn login<P: IdentityProvider>(State(state): State<AuthState<P>>) -> impl IntoResponse {
    found(state.provider.authorization_url())
}

// ── Callback ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

async fn callback<P: IdentityProvider>(
    State(state): State<AuthState<P>>,
    jar: CookieJar,
    query: Result<Query<CallbackParams>, QueryRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Query(params) = query.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Unreadable callback query");
        AuthError::MissingCode
    })?;

    if let Some(error) = &params.error {
        let desc = params.error_description.as_deref().unwrap_or("Unknown error");
        tracing::warn!(error = %error, description = %desc, "OAuth2 error from Discord");
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or(AuthError::MissingCode)?;

    let token_response = state.provider.exchange_code(&code).await.map_err(|e| {
        tracing::error!(error = %e, "Token exchange failed");
        AuthError::Upstream(e.to_string())
    })?;

    let user = state
        .provider
        .fetch_user(&token_response.access_token)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Discord user request failed");
            AuthError::Upstream(e.to_string())
        })?;

    let cookie_policy = &state.settings.cookie;
    let session_token = state
        .settings
        .signer
        .mint(&user, cookie_policy.ttl())
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, username = %user.username, "Discord login successful");

    // Cookie goes into the response parts together with the redirect.
    let jar = jar.add(cookie_policy.issue(session_token));
    Ok((jar, found(state.settings.login_redirect.clone())))
}

// ── Current identity ───────────────────────────────────────────────

async fn me(auth: AuthIdentity) -> Json<MeResponse> {
    Json(MeResponse {
        success: true,
        user: auth.user,
    })
}

// ── Logout ─────────────────────────────────────────────────────────

async fn logout<P: IdentityProvider>(
    State(state): State<AuthState<P>>,
    jar: CookieJar,
) -> (CookieJar, Json<SuccessResponse>) {
    let cookie_policy = &state.settings.cookie;
    let had_session = cookie_policy.token(&jar).is_some();
    tracing::info!(had_session, "Logout");

    // Always emitted, even without a session, with the attributes used at login.
    let jar = jar.add(cookie_policy.clear());
    (jar, Json(SuccessResponse::with_message("Logged out")))
}

// ── Helpers ────────────────────────────────────────────────────────

/// `302 Found` redirect.
fn found(location: String) -> (StatusCode, [(HeaderName, String); 1]) {
    (StatusCode::FOUND, [(LOCATION, location)])
}
