//! Single mapping point from backend/provider JSON to typed values.
//!
//! | Upstream shape                                    | Result              |
//! |---------------------------------------------------|---------------------|
//! | `{success, user: {id, username, name, avatar}}`   | `Identity`          |
//! | `{id, username, name?, avatar?}`                  | `Identity`          |
//! | `{id, username, global_name?, avatar?}` (Discord) | `Identity`          |
//! | `{discordId, username, globalName?, avatar?}`     | `Identity`          |
//! | `{success, data: Character}`                      | `Character`         |
//! | `{success, character: Character}`                 | `Character`         |
//! | `{hasCharacter, character?}`                      | `Option<Character>` |
//! | `{available, message?}`                           | availability        |
//! | `{success: false, error: {code, message}}`        | `Rejection`         |
//! | `{success: false, error: "text"}`                 | `Rejection::Other`  |

use serde::Deserialize;
use serde_json::Value;

use super::error::{ClientError, Rejection};
use crate::character::Character;
use crate::types::{DiscordId, Identity};

#[derive(Deserialize)]
struct RawIdentity {
    #[serde(alias = "discordId")]
    id: DiscordId,
    username: String,
    #[serde(default, alias = "global_name", alias = "globalName")]
    name: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdentityShape {
    Enveloped { user: RawIdentity },
    Bare(RawIdentity),
}

#[derive(Deserialize)]
struct CharacterEnvelope {
    #[serde(alias = "character")]
    data: Option<Character>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CharacterCheck {
    has_character: bool,
    #[serde(default)]
    character: Option<Character>,
}

/// Result of a username availability check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UsernameAvailability {
    pub available: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorField,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Detailed {
        code: String,
        #[serde(default)]
        message: Option<String>,
    },
    Text(String),
}

fn malformed(what: &str, e: &serde_json::Error) -> ClientError {
    ClientError::Malformed(format!("{what}: {e}"))
}

/// # Errors
///
/// [`ClientError::Malformed`] if `value` matches none of the identity shapes.
pub fn identity(value: Value) -> Result<Identity, ClientError> {
    let raw = match serde_json::from_value(value).map_err(|e| malformed("identity", &e))? {
        IdentityShape::Enveloped { user } | IdentityShape::Bare(user) => user,
    };
    Ok(Identity {
        id: raw.id,
        username: raw.username,
        name: raw.name,
        avatar: raw.avatar,
    })
}

/// Character from a create-character response.
///
/// # Errors
///
/// [`ClientError::Malformed`] if neither `data` nor `character` holds a character.
pub fn created_character(value: Value) -> Result<Character, ClientError> {
    let envelope: CharacterEnvelope =
        serde_json::from_value(value).map_err(|e| malformed("character", &e))?;
    envelope
        .data
        .ok_or_else(|| ClientError::Malformed("character: response has no character".into()))
}

/// Character, if any, from a check-character response.
///
/// # Errors
///
/// [`ClientError::Malformed`] if `hasCharacter` is missing, or is `true`
/// without a character attached.
pub fn character_check(value: Value) -> Result<Option<Character>, ClientError> {
    let check: CharacterCheck =
        serde_json::from_value(value).map_err(|e| malformed("character check", &e))?;
    match (check.has_character, check.character) {
        (true, Some(character)) => Ok(Some(character)),
        (true, None) => Err(ClientError::Malformed(
            "character check: hasCharacter without character".into(),
        )),
        (false, _) => Ok(None),
    }
}

/// # Errors
///
/// [`ClientError::Malformed`] if `available` is missing.
pub fn username_availability(value: Value) -> Result<UsernameAvailability, ClientError> {
    serde_json::from_value(value).map_err(|e| malformed("username check", &e))
}

/// Rejection from an error envelope, or `None` if `value` is not one.
#[must_use]
pub fn rejection(value: Value) -> Option<Rejection> {
    let envelope: ErrorEnvelope = serde_json::from_value(value).ok()?;
    Some(match envelope.error {
        ErrorField::Detailed { code, message } => Rejection::from_code(&code, message),
        ErrorField::Text(message) => Rejection::Other {
            code: None,
            message,
        },
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::character::Gender;

    fn nova() -> Identity {
        Identity {
            id: "42".parse().unwrap(),
            username: "nova".into(),
            name: Some("Nova".into()),
            avatar: Some("ava1".into()),
        }
    }

    #[test]
    fn identity_from_me_envelope() {
        let value = json!({
            "success": true,
            "user": {"id": "42", "username": "nova", "name": "Nova", "avatar": "ava1"},
        });
        assert_eq!(identity(value).unwrap(), nova());
    }

    #[test]
    fn identity_from_bare_object() {
        let value = json!({"id": "42", "username": "nova", "name": "Nova", "avatar": "ava1"});
        assert_eq!(identity(value).unwrap(), nova());
    }

    #[test]
    fn identity_from_discord_profile() {
        let value = json!({
            "id": "42",
            "username": "nova",
            "global_name": "Nova",
            "avatar": "ava1",
            "email": "n@x.io",
            "discriminator": "0",
        });
        assert_eq!(identity(value).unwrap(), nova());
    }

    #[test]
    fn identity_from_camel_case_profile() {
        let value = json!({
            "discordId": "42",
            "username": "nova",
            "globalName": "Nova",
            "avatar": "ava1",
        });
        assert_eq!(identity(value).unwrap(), nova());
    }

    #[test]
    fn identity_null_optionals() {
        let value = json!({"user": {"id": "42", "username": "nova", "name": null, "avatar": null}});
        let id = identity(value).unwrap();
        assert!(id.name.is_none());
        assert!(id.avatar.is_none());
    }

    #[test]
    fn identity_rejects_error_envelope() {
        let value = json!({"success": false, "error": {"code": "NO_TOKEN", "message": "No token provided."}});
        assert!(matches!(identity(value), Err(ClientError::Malformed(_))));
    }

    fn character_json() -> Value {
        json!({
            "discordId": "42",
            "charUsername": "nova_knight",
            "charName": "Nova Knight",
            "charBirthday": "2000-01-31",
            "charGender": "Perempuan",
        })
    }

    #[test]
    fn created_character_from_data_or_character() {
        let from_data = created_character(json!({"success": true, "data": character_json()})).unwrap();
        let from_character =
            created_character(json!({"success": true, "character": character_json(), "message": "ok"}))
                .unwrap();
        assert_eq!(from_data, from_character);
        assert_eq!(from_data.char_gender, Gender::Female);
    }

    #[test]
    fn created_character_missing() {
        assert!(created_character(json!({"success": true})).is_err());
    }

    #[test]
    fn character_check_shapes() {
        assert_eq!(character_check(json!({"hasCharacter": false})).unwrap(), None);
        let found = character_check(json!({"success": true, "hasCharacter": true, "character": character_json()}))
            .unwrap()
            .unwrap();
        assert_eq!(found.char_username, "nova_knight");
        assert!(character_check(json!({"hasCharacter": true})).is_err());
        assert!(character_check(json!({"success": true})).is_err());
    }

    #[test]
    fn rejections() {
        assert_eq!(
            rejection(json!({"success": false, "error": {"code": "INVALID_TOKEN", "message": "x"}})),
            Some(Rejection::NotAuthenticated)
        );
        assert_eq!(
            rejection(json!({"success": false, "error": {"code": "USERNAME_TAKEN", "message": "x"}})),
            Some(Rejection::UsernameTaken)
        );
        assert_eq!(
            rejection(json!({"success": false, "error": "Authentication failed"})),
            Some(Rejection::Other {
                code: None,
                message: "Authentication failed".into()
            })
        );
        assert_eq!(
            rejection(json!({"success": false, "error": {"code": "RATE_LIMITED", "message": "slow down"}})),
            Some(Rejection::Other {
                code: Some("RATE_LIMITED".into()),
                message: "slow down".into()
            })
        );
        assert_eq!(rejection(json!({"success": true})), None);
    }
}
