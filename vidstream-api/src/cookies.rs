/// HttpOnly token cookie transport
///
/// Browser clients receive both tokens as Secure, HttpOnly, SameSite=Strict
/// cookies so script code never needs access to the raw values. Non-browser
/// clients use the JSON body and the `Authorization: Bearer` header instead;
/// both transports carry the same tokens.
use axum::http::{HeaderMap, HeaderValue};
use vidstream_shared::session::TokenPair;

/// Cookie carrying the access token
pub const ACCESS_COOKIE: &str = "accessToken";

/// Cookie carrying the refresh token
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Extracts a named cookie value from request headers
pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get("cookie")?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some((k, v)) = p.split_once('=') {
            if k == name {
                return Some(v.to_string());
            }
        }
    }
    None
}

fn token_cookie(name: &str, value: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={}; HttpOnly; Secure; SameSite=Strict; Path=/",
        name, value
    ))
    .ok()
}

fn expired_cookie(name: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; Secure; SameSite=Strict; Path=/",
        name
    ))
    .ok()
}

/// Appends Set-Cookie headers delivering a fresh token pair
pub fn set_token_cookies(headers: &mut HeaderMap, tokens: &TokenPair) {
    if let Some(v) = token_cookie(ACCESS_COOKIE, &tokens.access_token) {
        headers.append("set-cookie", v);
    }
    if let Some(v) = token_cookie(REFRESH_COOKIE, &tokens.refresh_token) {
        headers.append("set-cookie", v);
    }
}

/// Appends Set-Cookie headers instructing the client to drop both tokens
pub fn clear_token_cookies(headers: &mut HeaderMap) {
    if let Some(v) = expired_cookie(ACCESS_COOKIE) {
        headers.append("set-cookie", v);
    }
    if let Some(v) = expired_cookie(REFRESH_COOKIE) {
        headers.append("set-cookie", v);
    }
}
