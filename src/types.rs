use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::Error;

const CDN_BASE: &str = "https://cdn.discordapp.com";

/// Discord user identifier (snowflake).
///
/// Guaranteed valid by construction: 1 to 20 ASCII digits.
/// Use `"80351110224678912".parse::<DiscordId>()` or `DiscordId::try_from(string)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(try_from = "String", into = "String")]
pub struct DiscordId(String);

impl DiscordId {
    /// For literals known to be valid snowflakes.
    #[cfg_attr(not(feature = "consumer"), allow(dead_code))]
    pub(crate) fn from_static(raw: &'static str) -> Self {
        debug_assert!(raw.parse::<Self>().is_ok());
        Self(raw.to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for DiscordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for DiscordId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if !s.is_empty() && s.len() <= 20 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s))
        } else {
            Err(Error::InvalidDiscordId(s))
        }
    }
}

impl From<DiscordId> for String {
    fn from(id: DiscordId) -> Self {
        id.0
    }
}

/// Verified identity of the current session.
///
/// Serialized exactly as the `user` object of `GET /auth/me`. The server-side
/// verifier, the client-side consumer and the development fixtures all use
/// this one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: DiscordId,
    pub username: String,
    /// Display name (Discord `global_name`).
    pub name: Option<String>,
    /// Avatar hash.
    pub avatar: Option<String>,
}

impl Identity {
    /// Name to show in the UI: display name if set, otherwise username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.username)
    }

    /// CDN URL of the avatar, or of the default embed avatar when unset.
    #[must_use]
    pub fn avatar_url(&self) -> String {
        match &self.avatar {
            Some(hash) => format!("{CDN_BASE}/avatars/{}/{hash}.png", self.id),
            None => {
                let index = self
                    .id
                    .as_str()
                    .parse::<u64>()
                    .map(|snowflake| (snowflake >> 22) % 6)
                    .unwrap_or(0);
                format!("{CDN_BASE}/embed/avatars/{index}.png")
            }
        }
    }
}

/// Current user from `GET /users/@me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct DiscordUser {
    pub id: DiscordId,
    pub username: String,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl DiscordUser {
    /// Create a `DiscordUser` with only the required fields.
    #[must_use]
    pub fn new(id: DiscordId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            discriminator: None,
            global_name: None,
            avatar: None,
            email: None,
        }
    }

    #[must_use]
    pub fn with_global_name(mut self, name: impl Into<String>) -> Self {
        self.global_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(avatar: Option<&str>) -> Identity {
        Identity {
            id: "80351110224678912".parse().unwrap(),
            username: "nelly".into(),
            name: None,
            avatar: avatar.map(Into::into),
        }
    }

    #[test]
    fn valid_discord_id() {
        assert!("42".parse::<DiscordId>().is_ok());
        assert!("80351110224678912".parse::<DiscordId>().is_ok());
        assert!("12345678901234567890".parse::<DiscordId>().is_ok());
    }

    #[test]
    fn invalid_discord_id() {
        assert!("".parse::<DiscordId>().is_err());
        assert!("123456789012345678901".parse::<DiscordId>().is_err());
        assert!("12a4".parse::<DiscordId>().is_err());
        assert!("-42".parse::<DiscordId>().is_err());
    }

    #[test]
    fn discord_id_rejected_during_deserialize() {
        let err = serde_json::from_str::<DiscordId>("\"abc\"");
        assert!(err.is_err());
        let id: DiscordId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn identity_serializes_as_me_user_object() {
        let json = serde_json::to_value(identity(Some("ava1"))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "80351110224678912",
                "username": "nelly",
                "name": null,
                "avatar": "ava1",
            })
        );
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let mut user = identity(None);
        assert_eq!(user.display_name(), "nelly");
        user.name = Some("Nelly".into());
        assert_eq!(user.display_name(), "Nelly");
    }

    #[test]
    fn avatar_url_uses_hash() {
        assert_eq!(
            identity(Some("ava1")).avatar_url(),
            "https://cdn.discordapp.com/avatars/80351110224678912/ava1.png"
        );
    }

    #[test]
    fn avatar_url_default_from_snowflake() {
        // (80351110224678912 >> 22) % 6 == 5
        assert_eq!(
            identity(None).avatar_url(),
            "https://cdn.discordapp.com/embed/avatars/5.png"
        );
    }
}
