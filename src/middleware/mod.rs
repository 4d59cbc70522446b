//! Discord login and cookie-session middleware for Axum.
//!
//! The session is a signed, time-limited credential stored in an HttpOnly
//! cookie; no server-side session storage exists.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use spacewalk_accounts::middleware::{SessionAuthConfig, auth_routes, AuthIdentity};
//!
//! // 1. Configure from environment
//! let config = SessionAuthConfig::from_env()?;
//!
//! // 2. Mount auth routes
//! let app = axum::Router::new().merge(auth_routes(config));
//!
//! // 3. Use AuthIdentity in handlers whose state provides a SessionVerifier
//! async fn handler(auth: AuthIdentity) -> String {
//!     auth.user.username
//! }
//! ```

mod config;
mod cookies;
mod error;
mod extractor;
mod routes;
mod state;
mod traits;
mod types;

pub use config::SessionAuthConfig;
pub use error::AuthError;
pub use extractor::{AuthIdentity, SessionVerifier, resolve_session};
pub use routes::auth_routes;
pub use traits::IdentityProvider;
pub use types::{ErrorBody, ErrorDetail, MeResponse, SuccessResponse};
