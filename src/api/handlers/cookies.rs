use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};

use crate::session::SessionId;

pub const SESSION_COOKIE_NAME: &str = "bastion_session";

/// Session id from the request cookie, if present and well formed.
pub fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == SESSION_COOKIE_NAME)
        .and_then(|(_, value)| SessionId::parse(value.trim()))
}

/// `HttpOnly` session cookie, `Secure` when served over HTTPS.
pub fn session_cookie(
    session: &SessionId,
    ttl_seconds: u64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}",
        session.as_str()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn reads_session_among_other_cookies() -> Result<(), StoreError> {
        let id = SessionId::generate()?;
        let mut headers = HeaderMap::new();
        let raw = format!("theme=dark; {SESSION_COOKIE_NAME}={}; lang=en", id.as_str());
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&raw).map_err(|e| StoreError::Unavailable(e.to_string()))?,
        );
        assert_eq!(session_from_headers(&headers), Some(id));
        Ok(())
    }

    #[test]
    fn ignores_forged_session_values() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("bastion_session=admin"));
        assert_eq!(session_from_headers(&headers), None);
        assert_eq!(session_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn cookie_attributes() -> Result<(), Box<dyn std::error::Error>> {
        let id = SessionId::generate()?;
        let plain = session_cookie(&id, 7200, false)?;
        let plain = plain.to_str()?;
        assert!(plain.starts_with("bastion_session="));
        assert!(plain.contains("HttpOnly; SameSite=Lax; Max-Age=7200"));
        assert!(!plain.contains("Secure"));

        let secure = session_cookie(&id, 60, true)?;
        assert!(secure.to_str()?.ends_with("; Secure"));
        Ok(())
    }
}
