/// Why the backend refused a request, decoded from its error envelope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("not signed in")]
    NotAuthenticated,
    #[error("a character already exists for this account")]
    CharacterExists,
    #[error("username is already taken")]
    UsernameTaken,
    #[error("all fields are required")]
    MissingFields,
    #[error("{message}")]
    Other {
        code: Option<String>,
        message: String,
    },
}

impl Rejection {
    /// Map a backend error code (and optional message) to a rejection.
    #[must_use]
    pub fn from_code(code: &str, message: Option<String>) -> Self {
        match code {
            "NO_TOKEN" | "INVALID_TOKEN" => Self::NotAuthenticated,
            "CHARACTER_EXISTS" => Self::CharacterExists,
            "USERNAME_TAKEN" => Self::UsernameTaken,
            "MISSING_FIELDS" => Self::MissingFields,
            other => Self::Other {
                code: Some(other.to_owned()),
                message: message.unwrap_or_else(|| other.to_owned()),
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}")]
    Status { status: u16 },
    #[error("request rejected: {0}")]
    Rejected(Rejection),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// Whether the failure means "no valid session" rather than a fault.
    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::Status { status: 401 } | Self::Rejected(Rejection::NotAuthenticated)
        )
    }
}
