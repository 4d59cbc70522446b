#![cfg(feature = "consumer")]

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use spacewalk_accounts::consumer::{
    AuthStatus, ClientError, Navigation, Rejection, SessionConsumer,
};
use spacewalk_accounts::{Gender, NewCharacter};

fn consumer_for(server: &MockServer) -> SessionConsumer {
    SessionConsumer::remote(Url::parse(&server.uri()).unwrap()).unwrap()
}

fn me_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "user": {"id": "42", "username": "nova", "name": "Nova", "avatar": "ava1"},
    }))
}

fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "success": false,
        "error": {"code": "NO_TOKEN", "message": "No token provided."},
    }))
}

#[tokio::test]
async fn check_auth_authenticated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(me_ok())
        .mount(&server)
        .await;

    let mut session = consumer_for(&server);
    match session.check_auth().await.unwrap() {
        AuthStatus::Authenticated(identity) => assert_eq!(identity.display_name(), "Nova"),
        AuthStatus::Anonymous => panic!("expected a session"),
    }
    assert!(session.is_authenticated());
    assert_eq!(session.user().map(|u| u.id.as_str()), Some("42"));
}

#[tokio::test]
async fn check_auth_anonymous_on_401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;

    let mut session = consumer_for(&server);
    assert_eq!(session.check_auth().await.unwrap(), AuthStatus::Anonymous);
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn check_auth_server_error_clears_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(me_ok())
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut session = consumer_for(&server);
    session.check_auth().await.unwrap();
    assert!(session.is_authenticated());

    let err = session.check_auth().await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 503 }));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn ensure_session_redirects_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;

    let mut session = consumer_for(&server);
    let expected = Url::parse(&format!("{}/auth/discord", server.uri())).unwrap();
    assert_eq!(
        session.ensure_session().await,
        Navigation::RedirectToLogin(expected)
    );
    assert_eq!(session.ensure_session().await, Navigation::ShowLogin);
    assert_eq!(session.ensure_session().await, Navigation::ShowLogin);
}

#[tokio::test]
async fn ensure_session_error_never_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut session = consumer_for(&server);
    assert!(matches!(
        session.ensure_session().await,
        Navigation::ShowError(_)
    ));
}

#[tokio::test]
async fn logout_clears_even_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(me_ok())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = consumer_for(&server);
    session.check_auth().await.unwrap();
    assert!(session.logout().await.is_err());
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn check_username_encodes_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/char/check-username"))
        .and(query_param("charUsername", "nova knight&co"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "available": false,
            "message": "Username is already taken",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let availability = consumer_for(&server)
        .check_username("nova knight&co")
        .await
        .unwrap();
    assert!(!availability.available);
}

#[tokio::test]
async fn check_character_401_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/char/check-character"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;

    let mut session = consumer_for(&server);
    assert_eq!(session.check_character().await.unwrap(), None);
    assert!(session.character().is_none());
}

fn luna() -> NewCharacter {
    NewCharacter {
        char_username: "luna".into(),
        char_name: "Luna Star".into(),
        char_birthday: "2001-02-03".into(),
        char_gender: Gender::Female,
    }
}

#[tokio::test]
async fn create_character_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/char/create-character"))
        .and(body_json(json!({
            "charUsername": "luna",
            "charName": "Luna Star",
            "charBirthday": "2001-02-03",
            "charGender": "Perempuan",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "character": {
                "discordId": "42",
                "charUsername": "luna",
                "charName": "Luna Star",
                "charBirthday": "2001-02-03",
                "charGender": "Perempuan",
                "charCreatedAt": "2026-01-01T00:00:00.000Z",
            },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = consumer_for(&server);
    let created = session.create_character(&luna()).await.unwrap();
    assert_eq!(created.discord_id.as_str(), "42");
    assert_eq!(session.character(), Some(&created));
}

#[tokio::test]
async fn create_character_rejections() {
    let cases = [
        (409, "USERNAME_TAKEN", Rejection::UsernameTaken),
        (409, "CHARACTER_EXISTS", Rejection::CharacterExists),
        (400, "MISSING_FIELDS", Rejection::MissingFields),
        (401, "INVALID_TOKEN", Rejection::NotAuthenticated),
    ];

    for (status, code, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/char/create-character"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "success": false,
                "error": {"code": code, "message": "refused"},
            })))
            .mount(&server)
            .await;

        let err = consumer_for(&server).create_character(&luna()).await.unwrap_err();
        match err {
            ClientError::Rejected(rejection) => assert_eq!(rejection, expected, "{code}"),
            other => panic!("unexpected error for {code}: {other:?}"),
        }
    }
}

#[tokio::test]
async fn create_character_without_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/char/create-character"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = consumer_for(&server).create_character(&luna()).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 502 }));
}
