use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::error::ApiResult;

pub const SESSION_COOKIE: &str = "moviebook_session";
const SESSION_TTL_DAYS: i64 = 7;

/// The whole session state: encrypted into the cookie, nothing server-side.
/// A cookie issued before logout on another device stays valid until expiry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub email: String,
    pub name: String,
}

pub fn insert(jar: PrivateCookieJar, user: &SessionUser, secure: bool) -> ApiResult<PrivateCookieJar> {
    let value = serde_json::to_string(user).map_err(anyhow::Error::new)?;
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(Duration::days(SESSION_TTL_DAYS));
    cookie.set_secure(secure);
    Ok(jar.add(cookie))
}

pub fn read(jar: &PrivateCookieJar) -> Option<SessionUser> {
    let cookie = jar.get(SESSION_COOKIE)?;
    serde_json::from_str(cookie.value()).ok()
}

pub fn destroy(jar: PrivateCookieJar) -> PrivateCookieJar {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    jar.remove(cookie)
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::cookie::Key;

    use super::*;

    fn jar() -> PrivateCookieJar {
        PrivateCookieJar::new(Key::derive_from(b"an-unguessable-test-secret-of-32+"))
    }

    fn sample_user() -> SessionUser {
        SessionUser { id: 7, email: "alice@example.com".to_string(), name: "Alice".to_string() }
    }

    #[test]
    fn round_trip() {
        let jar = insert(jar(), &sample_user(), false).unwrap();
        assert_eq!(read(&jar), Some(sample_user()));
    }

    #[test]
    fn destroy_clears_the_session() {
        let jar = insert(jar(), &sample_user(), false).unwrap();
        let jar = destroy(jar);
        assert_eq!(read(&jar), None);
    }

    #[test]
    fn cookie_attributes() {
        let jar = insert(jar(), &sample_user(), true).unwrap();
        let cookie = jar.get(SESSION_COOKIE).unwrap();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(Duration::days(7)));
    }

    #[test]
    fn garbage_payload_is_ignored() {
        let jar = jar().add(Cookie::new(SESSION_COOKIE, "not json"));
        assert_eq!(read(&jar), None);
    }
}
