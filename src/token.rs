use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::error::Error;
use crate::types::{DiscordId, DiscordUser, Identity};

/// Minimum HS256 secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Payload of the session credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: DiscordId,
    #[serde(default)]
    pub email: Option<String>,
    pub username: String,
    /// Discord `global_name`.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    pub iat: u64,
    pub exp: u64,
}

impl SessionClaims {
    /// The identity exposed to request handlers.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            username: self.username.clone(),
            name: self.name.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Mints and verifies HS256 session credentials with a process-wide secret.
#[derive(Clone)]
pub struct SessionSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").finish_non_exhaustive()
    }
}

impl SessionSigner {
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the secret is shorter than [`MIN_SECRET_LEN`] bytes.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, Error> {
        let secret = secret.as_ref();
        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::Config(format!(
                "signing secret must be at least {MIN_SECRET_LEN} bytes, got {}",
                secret.len()
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Mint a credential for `user` valid for `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Token`] if encoding fails.
    pub fn mint(&self, user: &DiscordUser, ttl: Duration) -> Result<String, Error> {
        self.mint_at(user, ttl, OffsetDateTime::now_utc())
    }

    /// Mint a credential as if issued at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Token`] if encoding fails.
    pub fn mint_at(
        &self,
        user: &DiscordUser,
        ttl: Duration,
        issued_at: OffsetDateTime,
    ) -> Result<String, Error> {
        let claims = SessionClaims {
            id: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            name: user.global_name.clone(),
            avatar: user.avatar.clone(),
            iat: unix_seconds(issued_at),
            exp: unix_seconds(issued_at + ttl),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Token(e.to_string()))
    }

    /// Verify signature and expiry, then return the payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TokenExpired`] past `exp`, or [`Error::Token`] for any
    /// malformed, tampered or foreign-key token.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, Error> {
        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => Error::TokenExpired,
                _ => Error::Token(e.to_string()),
            })
    }
}

fn unix_seconds(at: OffsetDateTime) -> u64 {
    u64::try_from(at.unix_timestamp()).unwrap_or(0)
}
