use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
};
use cookie::{time::Duration, Cookie, SameSite};
use std::convert::Infallible;

/// Holds the CMS-issued JWT. The name is shared with the CMS tooling.
pub const SESSION_COOKIE: &str = "strapiJwt";
pub const SESSION_MAX_AGE_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    pub secure: bool,
}

impl CookiePolicy {
    pub fn issue(&self, jwt: &str) -> Cookie<'static> {
        self.base(jwt.to_string(), Duration::days(SESSION_MAX_AGE_DAYS))
    }

    /// Same cookie, empty, expiring immediately.
    pub fn clear(&self) -> Cookie<'static> {
        self.base(String::new(), Duration::ZERO)
    }

    pub fn header(cookie: &Cookie<'_>) -> (header::HeaderName, HeaderValue) {
        let value = HeaderValue::from_str(&cookie.to_string())
            .unwrap_or_else(|_| HeaderValue::from_static(""));
        (header::SET_COOKIE, value)
    }

    fn base(&self, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(max_age)
            .build()
    }
}

/// The session token from the request's `Cookie` headers, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Optional session: a missing cookie means anonymous, never a rejection.
#[derive(Debug, Clone, Default)]
pub struct Session(pub Option<String>);

impl Session {
    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Session(session_token(&parts.headers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_cookie() {
        let cookie = CookiePolicy { secure: false }.issue("abc");
        let rendered = cookie.to_string();
        assert!(rendered.starts_with("strapiJwt=abc"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Max-Age=2592000"));
        assert!(!rendered.contains("Secure"));

        let secure = CookiePolicy { secure: true }.issue("abc").to_string();
        assert!(secure.contains("Secure"));
    }

    #[test]
    fn test_clear_cookie() {
        let rendered = CookiePolicy { secure: false }.clear().to_string();
        assert!(rendered.starts_with("strapiJwt=;"));
        assert!(rendered.contains("Max-Age=0"));
        assert!(rendered.contains("HttpOnly"));
    }

    #[test]
    fn test_session_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; strapiJwt=tok123"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("tok123"));

        headers.insert(header::COOKIE, HeaderValue::from_static("strapiJwt="));
        assert_eq!(session_token(&headers), None);
    }
}
