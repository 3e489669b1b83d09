//! Session cookie handling.
//!
//! The session token travels in a `token` cookie; API clients may send the same
//! JWT as `Authorization: Bearer <token>` instead.

use axum::http::{header, HeaderMap, HeaderValue};

/// Name of the session cookie
pub const TOKEN_COOKIE: &str = "token";

/// Returns the session token from the `token` cookie, falling back to a bearer
/// `Authorization` header.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, TOKEN_COOKIE).or_else(|| bearer_token(headers))
}

/// Looks `name` up across every `Cookie` header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| key.trim() == name && !value.trim().is_empty())
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// `Set-Cookie` value carrying a freshly issued token.
pub fn session_cookie(token: &str, max_age_secs: u64, secure: bool) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

/// `Set-Cookie` value that expires the session cookie.
pub fn clear_cookie(secure: bool) -> HeaderValue {
    if secure {
        HeaderValue::from_static("token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Secure")
    } else {
        HeaderValue::from_static("token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn headers_with(name: header::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn cookie_wins_over_bearer() {
        let mut headers = headers_with(header::COOKIE, "theme=dark; token=abc.def.ghi");
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer other"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_used_without_cookie() {
        let headers = headers_with(header::AUTHORIZATION, "Bearer abc.def");
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn empty_cookie_is_ignored() {
        let headers = headers_with(header::COOKIE, "token=; theme=dark");
        assert_eq!(extract_token(&headers), None);
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }

    #[test]
    fn similarly_named_cookie_does_not_match() {
        let headers = headers_with(header::COOKIE, "xtoken=nope; token_old=nope");
        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn session_cookie_flags() {
        let cookie = session_cookie("t.o.k", 3600, true).unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("token=t.o.k;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.ends_with("; Secure"));

        assert!(!clear_cookie(false).to_str().unwrap().contains("Secure"));
    }

    proptest! {
        #[test]
        fn token_found_among_other_cookies(
            token in "[A-Za-z0-9_-]{1,40}\\.[A-Za-z0-9_-]{1,40}\\.[A-Za-z0-9_-]{1,40}",
            before in proptest::collection::vec("[a-z]{1,8}=[a-z0-9]{0,8}", 0..4),
            after in proptest::collection::vec("[a-z]{1,8}=[a-z0-9]{0,8}", 0..4),
        ) {
            let others_named_token = before.iter().chain(after.iter()).any(|c| c.starts_with("token="));
            prop_assume!(!others_named_token);

            let mut parts = before.clone();
            parts.push(format!("token={token}"));
            parts.extend(after.clone());
            let headers = headers_with(header::COOKIE, &parts.join("; "));

            prop_assert_eq!(extract_token(&headers), Some(token));
        }

        #[test]
        fn bearer_round_trips(token in "[A-Za-z0-9._-]{1,80}") {
            let headers = headers_with(header::AUTHORIZATION, &format!("Bearer {token}"));
            prop_assert_eq!(extract_token(&headers), Some(token));
        }
    }
}
