#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Discord {operation} failed (status {status:?}): {detail}")]
    OAuth {
        operation: &'static str,
        status: Option<u16>,
        detail: String,
    },
    #[cfg(feature = "oauth")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Token verification error: {0}")]
    Token(String),
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid Discord id: {0:?}")]
    InvalidDiscordId(String),
    #[error("Configuration error: {0}")]
    Config(String),
}
