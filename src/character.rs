//! Character registration: wire types and the client-side form validator.

use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::format_description;

use crate::types::DiscordId;

pub const USERNAME_MIN_LEN: usize = 4;
pub const USERNAME_MAX_LEN: usize = 30;
pub const NAME_MIN_LEN: usize = 5;
pub const NAME_MAX_LEN: usize = 32;
pub const MIN_AGE: i32 = 13;
pub const MAX_AGE: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "Laki-laki")]
    Male,
    #[serde(rename = "Perempuan")]
    Female,
}

/// Character as returned by the character endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub discord_id: DiscordId,
    pub char_username: String,
    pub char_name: String,
    /// `YYYY-MM-DD`.
    pub char_birthday: String,
    pub char_gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_updated_at: Option<String>,
}

/// Body of `POST /char/create-character`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCharacter {
    pub char_username: String,
    pub char_name: String,
    pub char_birthday: String,
    pub char_gender: Gender,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("username must be at least {USERNAME_MIN_LEN} characters")]
    UsernameTooShort,
    #[error("username must be at most {USERNAME_MAX_LEN} characters")]
    UsernameTooLong,
    #[error("username may only contain letters, digits, '.', '_' and '-'")]
    UsernameInvalid,
    #[error("character name must be {NAME_MIN_LEN}-{NAME_MAX_LEN} characters")]
    NameLength,
    #[error("character name may only contain letters and spaces")]
    NameInvalid,
    #[error("character name needs a first and last name")]
    NameSingleWord,
    #[error("birthday must be a date in YYYY-MM-DD format")]
    BirthdayInvalid,
    #[error("age must be between {MIN_AGE} and {MAX_AGE}, got {0}")]
    AgeOutOfRange(i32),
    #[error("gender is required")]
    GenderMissing,
}

/// Raw registration form input.
#[derive(Debug, Clone, Default)]
pub struct CharacterForm {
    pub username: String,
    pub name: String,
    pub birthday: String,
    pub gender: Option<Gender>,
}

impl CharacterForm {
    /// Check every field and build the request body.
    ///
    /// Collects all failures rather than stopping at the first one.
    ///
    /// # Errors
    ///
    /// Returns every [`FormError`] found.
    pub fn validate(&self, today: Date) -> Result<NewCharacter, Vec<FormError>> {
        let mut errors = Vec::new();

        let username = self.username.trim();
        let username_len = username.chars().count();
        if username_len < USERNAME_MIN_LEN {
            errors.push(FormError::UsernameTooShort);
        } else if username_len > USERNAME_MAX_LEN {
            errors.push(FormError::UsernameTooLong);
        }
        if !username.chars().all(is_username_char) {
            errors.push(FormError::UsernameInvalid);
        }

        let name = self.name.trim();
        let name_len = name.chars().count();
        if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&name_len) {
            errors.push(FormError::NameLength);
        }
        if !name.chars().all(is_name_char) {
            errors.push(FormError::NameInvalid);
        }
        if name.split_whitespace().count() < 2 {
            errors.push(FormError::NameSingleWord);
        }

        let format = format_description!("[year]-[month]-[day]");
        match Date::parse(self.birthday.trim(), &format) {
            Ok(birthday) => {
                let age = age_on(birthday, today);
                if !(MIN_AGE..=MAX_AGE).contains(&age) {
                    errors.push(FormError::AgeOutOfRange(age));
                }
            }
            Err(_) => errors.push(FormError::BirthdayInvalid),
        }

        if self.gender.is_none() {
            errors.push(FormError::GenderMissing);
        }

        match (errors.is_empty(), self.gender) {
            (true, Some(gender)) => Ok(NewCharacter {
                char_username: username.to_owned(),
                char_name: name.to_owned(),
                char_birthday: self.birthday.trim().to_owned(),
                char_gender: gender,
            }),
            _ => Err(errors),
        }
    }
}

/// Strip characters not allowed in a username (applied while typing).
#[must_use]
pub fn sanitize_username(input: &str) -> String {
    input.chars().filter(|&c| is_username_char(c)).collect()
}

/// Strip characters not allowed in a character name (applied while typing).
#[must_use]
pub fn sanitize_name(input: &str) -> String {
    input.chars().filter(|&c| is_name_char(c)).collect()
}

fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c.is_whitespace()
}

/// Full years between `birthday` and `today`.
fn age_on(birthday: Date, today: Date) -> i32 {
    let mut age = today.year() - birthday.year();
    if (today.month() as u8, today.day()) < (birthday.month() as u8, birthday.day()) {
        age -= 1;
    }
    age
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    const TODAY: Date = date!(2025 - 06 - 15);

    fn form() -> CharacterForm {
        CharacterForm {
            username: "nova_knight".into(),
            name: "Nova Knight".into(),
            birthday: "2000-01-31".into(),
            gender: Some(Gender::Female),
        }
    }

    #[test]
    fn valid_form_builds_request() {
        let body = form().validate(TODAY).unwrap();
        assert_eq!(body.char_username, "nova_knight");
        assert_eq!(body.char_name, "Nova Knight");
        assert_eq!(body.char_birthday, "2000-01-31");

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "charUsername": "nova_knight",
                "charName": "Nova Knight",
                "charBirthday": "2000-01-31",
                "charGender": "Perempuan",
            })
        );
    }

    #[test]
    fn collects_every_error() {
        let errors = CharacterForm::default().validate(TODAY).unwrap_err();
        assert_eq!(
            errors,
            vec![
                FormError::UsernameTooShort,
                FormError::NameLength,
                FormError::NameSingleWord,
                FormError::BirthdayInvalid,
                FormError::GenderMissing,
            ]
        );
    }

    #[test]
    fn username_rules() {
        let mut f = form();
        f.username = "abc".into();
        assert_eq!(f.validate(TODAY).unwrap_err(), vec![FormError::UsernameTooShort]);

        f.username = "nova knight".into();
        assert_eq!(f.validate(TODAY).unwrap_err(), vec![FormError::UsernameInvalid]);

        f.username = "n".repeat(USERNAME_MAX_LEN);
        assert!(f.validate(TODAY).is_ok());

        f.username = "n".repeat(USERNAME_MAX_LEN + 1);
        assert_eq!(f.validate(TODAY).unwrap_err(), vec![FormError::UsernameTooLong]);
    }

    #[test]
    fn name_rules() {
        let mut f = form();
        f.name = "Novaknight".into();
        assert_eq!(f.validate(TODAY).unwrap_err(), vec![FormError::NameSingleWord]);

        f.name = "Nova Kn1ght".into();
        assert_eq!(f.validate(TODAY).unwrap_err(), vec![FormError::NameInvalid]);

        f.name = "A B".into();
        assert_eq!(f.validate(TODAY).unwrap_err(), vec![FormError::NameLength]);

        f.name = format!("Nova {}", "k".repeat(30));
        assert_eq!(f.validate(TODAY).unwrap_err(), vec![FormError::NameLength]);
    }

    #[test]
    fn age_boundaries() {
        let mut f = form();
        f.birthday = "2012-06-15".into();
        assert!(f.validate(TODAY).is_ok(), "turns 13 today");

        f.birthday = "2012-06-16".into();
        assert_eq!(f.validate(TODAY).unwrap_err(), vec![FormError::AgeOutOfRange(12)]);

        f.birthday = "1924-06-16".into();
        assert!(f.validate(TODAY).is_ok(), "still 100");

        f.birthday = "1924-06-15".into();
        assert_eq!(f.validate(TODAY).unwrap_err(), vec![FormError::AgeOutOfRange(101)]);
    }

    #[test]
    fn birthday_must_be_iso_date() {
        let mut f = form();
        f.birthday = "31/01/2000".into();
        assert_eq!(f.validate(TODAY).unwrap_err(), vec![FormError::BirthdayInvalid]);
    }

    #[test]
    fn sanitizers_strip_disallowed() {
        assert_eq!(sanitize_username("no va!@#_k.n-1"), "nova_k.n-1");
        assert_eq!(sanitize_name("Nova 2 Knight!"), "Nova  Knight");
    }

    #[test]
    fn character_wire_format() {
        let character: Character = serde_json::from_value(serde_json::json!({
            "discordId": "42",
            "charUsername": "nova_knight",
            "charName": "Nova Knight",
            "charBirthday": "2000-01-31",
            "charGender": "Laki-laki",
        }))
        .unwrap();
        assert_eq!(character.char_gender, Gender::Male);
        assert!(character.char_created_at.is_none());
    }
}
