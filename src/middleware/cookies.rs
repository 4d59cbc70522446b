use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::{Duration, OffsetDateTime};

pub(super) const SESSION_COOKIE_NAME: &str = "__Secure-token";
pub(super) const DEFAULT_COOKIE_DOMAIN: &str = ".spacewalk.my.id";
pub(super) const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

/// Attributes of the session cookie.
///
/// Both the cookie that starts a session and the one that clears it are built
/// from the same policy, so HttpOnly, Secure, SameSite, Domain and Path never
/// diverge between the two.
#[derive(Debug, Clone)]
pub(crate) struct CookiePolicy {
    name: String,
    domain: String,
    path: String,
    ttl: Duration,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            name: SESSION_COOKIE_NAME.into(),
            domain: DEFAULT_COOKIE_DOMAIN.into(),
            path: "/".into(),
            ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
        }
    }
}

impl CookiePolicy {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Lifetime of both the credential and the cookie carrying it.
    pub(crate) fn ttl(&self) -> Duration {
        self.ttl
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_domain(&mut self, domain: String) {
        self.domain = domain;
    }

    pub(crate) fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }

    fn base(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), value))
            .http_only(true)
            .secure(true)
            .same_site(SameSite::Lax)
            .domain(self.domain.clone())
            .path(self.path.clone())
            .build()
    }

    /// Session cookie carrying `token`.
    pub(crate) fn issue(&self, token: String) -> Cookie<'static> {
        let mut cookie = self.base(token);
        cookie.set_max_age(self.ttl);
        cookie
    }

    /// Cookie that makes the browser drop the session cookie.
    pub(crate) fn clear(&self) -> Cookie<'static> {
        let mut cookie = self.base(String::new());
        cookie.set_max_age(Duration::ZERO);
        cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
        cookie
    }

    /// Session token from the request.
    pub(crate) fn token<'a>(&self, jar: &'a CookieJar) -> Option<&'a str> {
        session_token(jar, &self.name)
    }
}

/// Value of cookie `name`, treating an empty value as absent.
pub(super) fn session_token<'a>(jar: &'a CookieJar, name: &str) -> Option<&'a str> {
    jar.get(name)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
}
