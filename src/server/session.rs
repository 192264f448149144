//! Cookie-carried session identity.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

/// Returns the session id carried by `jar`, if it holds a well-formed one.
pub fn existing(jar: &CookieJar, cookie_name: &str) -> Option<String> {
    jar.get(cookie_name)
        .map(|cookie| cookie.value())
        .filter(|value| Uuid::parse_str(value).is_ok())
        .map(str::to_string)
}

/// Returns the caller's session id, issuing a fresh cookie on first contact
/// or when the presented one is malformed.
pub fn resolve(jar: CookieJar, cookie_name: &str) -> (CookieJar, String) {
    if let Some(id) = existing(&jar, cookie_name) {
        return (jar, id);
    }

    let id = Uuid::new_v4().to_string();
    let cookie = Cookie::build((cookie_name.to_string(), id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    tracing::debug!("Issued new session cookie");
    (jar.add(cookie), id)
}
