use axum::http::HeaderValue;

use crate::error::AppError;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const SESSION_COOKIE: &str = "session";
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

pub fn session_cookie(token: &str, secure: bool) -> Result<HeaderValue, AppError> {
    cookie(SESSION_COOKIE, token, SESSION_MAX_AGE_SECS, secure)
}

pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, AppError> {
    cookie(SESSION_COOKIE, "", 0, secure)
}

fn cookie(name: &str, value: &str, max_age: i64, secure: bool) -> Result<HeaderValue, AppError> {
    let mut cookie = format!("{name}={value}; HttpOnly; Max-Age={max_age}; Path=/; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|_| AppError::validation("cookie value contains invalid characters"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_shape() {
        let value = session_cookie("tok-123", false).unwrap();
        let s = value.to_str().unwrap();
        assert!(s.starts_with("session=tok-123;"));
        assert!(s.contains("HttpOnly"));
        assert!(s.contains("Max-Age=604800"));
        assert!(!s.contains("Secure"));
    }

    #[test]
    fn secure_flag_is_opt_in() {
        let value = session_cookie("tok", true).unwrap();
        assert!(value.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let value = clear_session_cookie(false).unwrap();
        let s = value.to_str().unwrap();
        assert!(s.starts_with("session=;"));
        assert!(s.contains("Max-Age=0"));
    }
}
