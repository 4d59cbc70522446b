use std::sync::Arc;

use axum::extract::FromRef;

use super::config::AuthSettings;
use super::extractor::SessionVerifier;
use super::traits::IdentityProvider;

/// Shared state for auth route handlers.
pub(super) struct AuthState<P> {
    pub(super) provider: Arc<P>,
    pub(super) settings: AuthSettings,
}

// Manual Clone: avoid derive adding a `P: Clone` bound.
impl<P> Clone for AuthState<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            settings: self.settings.clone(),
        }
    }
}

// AuthIdentity requires a SessionVerifier to be extractable from state
impl<P: IdentityProvider> FromRef<AuthState<P>> for SessionVerifier {
    fn from_ref(state: &AuthState<P>) -> Self {
        SessionVerifier::from_settings(&state.settings)
    }
}
