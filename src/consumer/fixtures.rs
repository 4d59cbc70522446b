//! Canned identities for running the consumer without a backend.

use crate::character::{Character, Gender};
use crate::types::{DiscordId, Identity};

/// Usernames the fixture backend reports as taken (compared case-insensitively).
pub const DEFAULT_TAKEN_USERNAMES: [&str; 5] = ["admin", "test", "spacewalk", "nova", "galaxy"];

/// Offline stand-in for the backend: one signed-in user and their character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureIdentity {
    pub identity: Identity,
    pub character: Option<Character>,
    pub taken_usernames: Vec<String>,
}

fn id(raw: &'static str) -> DiscordId {
    DiscordId::from_static(raw)
}

impl FixtureIdentity {
    /// User without a character and the default taken-username list.
    #[must_use]
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            character: None,
            taken_usernames: DEFAULT_TAKEN_USERNAMES.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// Returning player who already registered a character.
    #[must_use]
    pub fn with_character() -> Self {
        let discord_id = id("123456789012345678");
        let character = Character {
            discord_id: discord_id.clone(),
            char_username: "spacewalker".into(),
            char_name: "Space Walker".into(),
            char_birthday: "2000-01-15".into(),
            char_gender: Gender::Male,
            char_created_at: Some("2024-01-15T00:00:00.000Z".into()),
            char_updated_at: None,
        };
        Self {
            character: Some(character),
            ..Self::new(Identity {
                id: discord_id,
                username: "testuser".into(),
                name: Some("Test User".into()),
                avatar: Some("a1b2c3d4e5f6".into()),
            })
        }
    }

    /// First-time player with no character yet.
    #[must_use]
    pub fn without_character() -> Self {
        Self::new(Identity {
            id: id("987654321098765432"),
            username: "newuser".into(),
            name: Some("New User".into()),
            avatar: Some("f6e5d4c3b2a1".into()),
        })
    }

    #[must_use]
    pub fn another_user() -> Self {
        let discord_id = id("111222333444555666");
        let character = Character {
            discord_id: discord_id.clone(),
            char_username: "nova_knight".into(),
            char_name: "Nova Knight".into(),
            char_birthday: "1998-06-21".into(),
            char_gender: Gender::Female,
            char_created_at: Some("2024-03-02T00:00:00.000Z".into()),
            char_updated_at: None,
        };
        Self {
            character: Some(character),
            ..Self::new(Identity {
                id: discord_id,
                username: "galaxyexplorer".into(),
                name: Some("Galaxy Explorer".into()),
                avatar: Some("xyz123abc456".into()),
            })
        }
    }

    pub(super) fn is_taken(&self, username: &str) -> bool {
        self.taken_usernames
            .iter()
            .any(|taken| taken.eq_ignore_ascii_case(username))
    }
}
