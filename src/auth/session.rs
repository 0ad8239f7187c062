//! Session cookie for the mock login token.
//!
//! The cookie has no `Max-Age`, so browsers drop it when the session ends.
//! The token is read back as-is; nothing checks expiry.

use http::{
    HeaderMap, HeaderValue,
    header::{AUTHORIZATION, COOKIE, InvalidHeaderValue},
};

pub const SESSION_COOKIE_NAME: &str = "auth_token";

/// Build an `HttpOnly` session cookie carrying `token`.
pub fn session_cookie(token: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build a cookie that expires the session cookie immediately.
pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Session token from a bearer header or the session cookie, in that order.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let Some((key, val)) = pair.trim().split_once('=') else {
                continue;
            };
            if key.trim() == SESSION_COOKIE_NAME && !val.trim().is_empty() {
                return Some(val.trim().to_string());
            }
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("mock_jwt_token", false).unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "auth_token=mock_jwt_token; Path=/; HttpOnly; SameSite=Lax"
        );

        let secure = session_cookie("mock_jwt_token", true).unwrap();
        assert!(secure.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn test_clear_session_cookie_expires() {
        let cookie = clear_session_cookie(false).unwrap();
        assert!(cookie.to_str().unwrap().starts_with("auth_token=;"));
        assert!(cookie.to_str().unwrap().contains("Max-Age=0"));
    }

    #[test]
    fn test_extract_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; auth_token=mock_jwt_token; other=1"),
        );
        assert_eq!(
            extract_session_token(&headers).as_deref(),
            Some("mock_jwt_token")
        );
    }

    #[test]
    fn test_extract_prefers_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("auth_token=from_cookie"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from_header"));
        assert_eq!(extract_session_token(&headers).as_deref(), Some("from_header"));
    }

    #[test]
    fn test_extract_missing_or_cleared() {
        assert!(extract_session_token(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("auth_token=; theme=dark"));
        assert!(extract_session_token(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_session_token(&headers).is_none());
    }
}
