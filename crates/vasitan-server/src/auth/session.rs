//! Stateless signed session tokens carried in an HttpOnly cookie.
//!
//! Token layout: `<user_id>.<expires_unix>.<hex hmac-sha256>`. The server
//! keeps no session table, so a token stays valid until it expires or the
//! signing secret is rotated.

use std::fmt;

use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{AppError, AppResult};

pub const SESSION_COOKIE: &str = "vasitan_session";
const SESSION_DURATION_DAYS: i64 = 30;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct SessionKeys {
    mac: HmacSha256,
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

impl SessionKeys {
    pub fn new(secret: &[u8]) -> AppResult<Self> {
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| AppError::Internal(format!("Invalid session secret: {e}")))?;
        Ok(Self { mac })
    }

    pub fn issue(&self, user_id: i64) -> String {
        self.issue_at(user_id, Utc::now())
    }

    fn issue_at(&self, user_id: i64, now: DateTime<Utc>) -> String {
        let expires = (now + Duration::days(SESSION_DURATION_DAYS)).timestamp();
        let payload = format!("{user_id}.{expires}");
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        format!("{payload}.{signature}")
    }

    /// Resolves a token to its user id. Anything unsigned, expired or
    /// garbled resolves to `None`.
    pub fn verify(&self, token: &str) -> Option<i64> {
        self.verify_at(token, Utc::now())
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<i64> {
        let (payload, signature) = token.rsplit_once('.')?;
        let signature = hex::decode(signature).ok()?;

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let (user_id, expires) = payload.split_once('.')?;
        let user_id: i64 = user_id.parse().ok().filter(|id| *id > 0)?;
        let expires: i64 = expires.parse().ok()?;

        (expires > now.timestamp()).then_some(user_id)
    }
}

pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .max_age(time::Duration::days(SESSION_DURATION_DAYS))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// The user id bound to the request's session cookie, if any.
pub fn session_user_id(jar: &CookieJar, keys: &SessionKeys) -> Option<i64> {
    jar.get(SESSION_COOKIE).and_then(|c| keys.verify(c.value()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new(b"test-secret-that-is-long-enough-0123").unwrap()
    }

    #[test]
    fn issued_token_resolves_to_user() {
        let keys = keys();
        let token = keys.issue(42);
        assert_eq!(keys.verify(&token), Some(42));
    }

    #[test]
    fn cookie_round_trip_and_destroy() {
        let keys = keys();
        let jar = CookieJar::new().add(session_cookie(keys.issue(7), false));
        assert_eq!(session_user_id(&jar, &keys), Some(7));

        let jar = jar.add(removal_cookie());
        assert_eq!(session_user_id(&jar, &keys), None);
    }

    #[test]
    fn missing_cookie_is_no_session() {
        assert_eq!(session_user_id(&CookieJar::new(), &keys()), None);
    }

    #[test]
    fn garbled_tokens_are_no_session() {
        let keys = keys();
        for token in ["", "7", "abc", "7.123", "7.123.zz", "..", "-1.9999999999.00"] {
            assert_eq!(keys.verify(token), None, "{token:?} resolved");
        }
    }

    #[test]
    fn raw_user_id_cookie_is_rejected() {
        let keys = keys();
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "1"));
        assert_eq!(session_user_id(&jar, &keys), None);
    }

    #[test]
    fn tampered_user_id_fails_signature() {
        let keys = keys();
        let token = keys.issue(5);
        let forged = token.replacen('5', "6", 1);
        assert_eq!(keys.verify(&forged), None);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let other = SessionKeys::new(b"another-secret-that-is-long-enough!!").unwrap();
        assert_eq!(keys().verify(&other.issue(5)), None);
    }

    #[test]
    fn tokens_expire_after_thirty_days() {
        let keys = keys();
        let issued = Utc::now() - Duration::days(SESSION_DURATION_DAYS) - Duration::seconds(1);
        let token = keys.issue_at(9, issued);
        assert_eq!(keys.verify(&token), None);

        let fresh = keys.issue_at(9, Utc::now() - Duration::days(29));
        assert_eq!(keys.verify(&fresh), Some(9));
    }

    #[test]
    fn cookie_flags() {
        let cookie = session_cookie("t".into(), true);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(30)));
    }
}
