//! Session cookie plumbing.
//!
//! The serving layer, not the pipeline, owns the cookie: it extracts the
//! session ID from inbound `Cookie` headers and issues a `Set-Cookie` when
//! a dispatch ran under a session the client does not know yet.

use alexandria_core::SessionId;
use http::header::COOKIE;
use http::{HeaderMap, HeaderValue};

/// Extracts the session ID from the request's cookies, if present and
/// well-formed. A malformed cookie value reads as "no session".
pub(crate) fn session_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| value.parse().ok())
}

/// Builds the `Set-Cookie` value for a session.
pub(crate) fn session_cookie(cookie_name: &str, id: SessionId) -> HeaderValue {
    HeaderValue::try_from(format!("{cookie_name}={id}; Path=/; HttpOnly; SameSite=Lax"))
        .expect("session cookie value is ASCII")
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: &str = "ALEXSESSION";

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::try_from(value).unwrap());
        headers
    }

    #[test]
    fn test_round_trip() {
        let id = SessionId::new();
        let set_cookie = session_cookie(NAME, id);
        let pair = set_cookie
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let headers = headers_with_cookie(&pair);
        assert_eq!(session_from_headers(&headers, NAME), Some(id));
    }

    #[test]
    fn test_absent_cookie() {
        assert_eq!(session_from_headers(&HeaderMap::new(), NAME), None);
    }

    #[test]
    fn test_other_cookies_are_ignored() {
        let id = SessionId::new();
        let headers = headers_with_cookie(&format!("theme=dark; {NAME}={id}; lang=fr"));
        assert_eq!(session_from_headers(&headers, NAME), Some(id));
    }

    #[test]
    fn test_malformed_value_reads_as_no_session() {
        let headers = headers_with_cookie(&format!("{NAME}=not-a-uuid"));
        assert_eq!(session_from_headers(&headers, NAME), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let value = session_cookie(NAME, SessionId::new());
        let value = value.to_str().unwrap();
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Path=/"));
    }
}
