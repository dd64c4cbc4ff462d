//! Mapping from the codec's cookie instructions to HTTP cookies.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use dealdesk_auth::SessionCookie;

/// Build the HTTP cookie for a session instruction.
///
/// `HttpOnly` and `SameSite=Lax` are unconditional.
pub fn to_http_cookie(instruction: SessionCookie) -> Cookie<'static> {
    let max_age = Duration::seconds(instruction.max_age.num_seconds().max(0));

    Cookie::build((instruction.name, instruction.value))
        .http_only(true)
        .secure(instruction.secure)
        .same_site(SameSite::Lax)
        .path(instruction.path)
        .max_age(max_age)
        .build()
}

/// Apply a session instruction to the outgoing cookie jar.
pub fn apply(jar: CookieJar, instruction: SessionCookie) -> CookieJar {
    jar.add(to_http_cookie(instruction))
}
