#![doc = include_str!("../README.md")]

pub mod character;
pub mod error;
pub mod types;

#[cfg(feature = "consumer")]
pub mod consumer;
#[cfg(feature = "middleware")]
pub mod middleware;
#[cfg(feature = "oauth")]
pub mod oauth;
#[cfg(feature = "middleware")]
pub mod server;
#[cfg(feature = "token")]
pub mod token;

// Re-exports for convenient access
pub use character::{Character, CharacterForm, FormError, Gender, NewCharacter};
pub use error::Error;
#[cfg(feature = "oauth")]
pub use oauth::{DiscordClient, OAuthConfig, TokenResponse};
#[cfg(feature = "token")]
pub use token::{SessionClaims, SessionSigner};
pub use types::{DiscordId, DiscordUser, Identity};
