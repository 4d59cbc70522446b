use reqwest::StatusCode;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::normalize::{self, UsernameAvailability};
use super::{Backend, ClientError, Rejection, SessionConsumer};
use crate::character::{Character, NewCharacter};

impl SessionConsumer {
    /// Ask whether a character username is still free.
    ///
    /// # Errors
    ///
    /// Transport failures, error statuses and unreadable bodies.
    pub async fn check_username(&self, username: &str) -> Result<UsernameAvailability, ClientError> {
        let remote = match &self.backend {
            Backend::Remote(remote) => remote,
            Backend::Fixture(fixture) => {
                let available = !fixture.is_taken(username);
                return Ok(UsernameAvailability {
                    available,
                    message: (!available).then(|| "Username is already taken".to_owned()),
                });
            }
        };

        let path = format!(
            "char/check-username?charUsername={}",
            urlencoding::encode(username)
        );
        let response = remote.http().get(remote.endpoint(&path)?).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
            });
        }
        normalize::username_availability(response.json().await?)
    }

    /// Load the signed-in user's character. A 401 means there is none to load.
    ///
    /// # Errors
    ///
    /// Transport failures, non-401 error statuses and unreadable bodies.
    pub async fn check_character(&mut self) -> Result<Option<Character>, ClientError> {
        let found = match &self.backend {
            Backend::Fixture(fixture) => {
                if self.user.is_some() {
                    fixture.character.clone()
                } else {
                    None
                }
            }
            Backend::Remote(remote) => {
                let response = remote
                    .http()
                    .get(remote.endpoint("char/check-character")?)
                    .send()
                    .await?;
                match response.status() {
                    StatusCode::UNAUTHORIZED => None,
                    s if s.is_success() => normalize::character_check(response.json().await?)?,
                    s => return Err(ClientError::Status { status: s.as_u16() }),
                }
            }
        };
        self.character.clone_from(&found);
        Ok(found)
    }

    /// Register a character for the signed-in user.
    ///
    /// # Errors
    ///
    /// [`ClientError::Rejected`] when the backend refuses the request
    /// (not signed in, character exists, username taken, missing fields);
    /// otherwise transport failures and unexpected responses.
    pub async fn create_character(&mut self, body: &NewCharacter) -> Result<Character, ClientError> {
        let created = match &mut self.backend {
            Backend::Fixture(fixture) => {
                let Some(user) = &self.user else {
                    return Err(ClientError::Rejected(Rejection::NotAuthenticated));
                };
                if fixture.character.is_some() {
                    return Err(ClientError::Rejected(Rejection::CharacterExists));
                }
                if fixture.is_taken(&body.char_username) {
                    return Err(ClientError::Rejected(Rejection::UsernameTaken));
                }
                let character = Character {
                    discord_id: user.id.clone(),
                    char_username: body.char_username.clone(),
                    char_name: body.char_name.clone(),
                    char_birthday: body.char_birthday.clone(),
                    char_gender: body.char_gender,
                    char_created_at: OffsetDateTime::now_utc().format(&Rfc3339).ok(),
                    char_updated_at: None,
                };
                fixture.taken_usernames.push(body.char_username.clone());
                fixture.character = Some(character.clone());
                character
            }
            Backend::Remote(remote) => {
                let response = remote
                    .http()
                    .post(remote.endpoint("char/create-character")?)
                    .json(body)
                    .send()
                    .await?;
                let status = response.status();
                let value: serde_json::Value = response.json().await.unwrap_or_default();
                if !status.is_success() {
                    return Err(match normalize::rejection(value) {
                        Some(rejection) => ClientError::Rejected(rejection),
                        None => ClientError::Status {
                            status: status.as_u16(),
                        },
                    });
                }
                normalize::created_character(value)?
            }
        };

        tracing::info!(username = %created.char_username, "Character created");
        self.character = Some(created.clone());
        Ok(created)
    }
}
