use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use lambda_http::http::HeaderMap;
use sha2::Sha256;

use crate::types::SessionPayload;

pub const SESSION_COOKIE: &str = "session";
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(key: &str, payload: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(payload);
    mac
}

/// Issue a signed session token embedding `username` with a 7-day expiry.
/// Format: base64url(payload_json) "." base64url(hmac_sha256(key, payload_json)).
pub fn issue(username: &str, key: &str) -> String {
    let payload = SessionPayload {
        username: username.to_string(),
        expires_at: chrono::Utc::now().timestamp() + SESSION_TTL_SECS,
    };
    let payload_json = serde_json::to_vec(&payload).expect("session payload serializes");
    let sig = mac_for(key, &payload_json).finalize().into_bytes();
    format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(&payload_json),
        URL_SAFE_NO_PAD.encode(sig)
    )
}

/// Verify a session token. Any failure (malformed input, bad signature,
/// expired) yields `None`; this never errors.
pub fn verify(token: &str, key: &str) -> Option<SessionPayload> {
    let (payload_b64, sig_b64) = token.split_once('.')?;
    let payload_json = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
    let sig = URL_SAFE_NO_PAD.decode(sig_b64).ok()?;

    // Constant-time comparison via the Mac trait.
    mac_for(key, &payload_json).verify_slice(&sig).ok()?;

    let payload: SessionPayload = serde_json::from_slice(&payload_json).ok()?;
    if payload.expires_at <= chrono::Utc::now().timestamp() {
        return None;
    }
    Some(payload)
}

/// `Set-Cookie` value carrying a freshly issued session token.
pub fn set_cookie(token: &str, secure: bool) -> String {
    let secure_attr = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        SESSION_COOKIE, token, SESSION_TTL_SECS, secure_attr
    )
}

/// `Set-Cookie` value that clears the session cookie. Idempotent.
pub fn clear_cookie(secure: bool) -> String {
    let secure_attr = if secure { "; Secure" } else { "" };
    format!(
        "{}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax; Path=/{}",
        SESSION_COOKIE, secure_attr
    )
}

fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get("cookie").or_else(|| headers.get("Cookie"))?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == name {
                return Some(v[1..].to_string());
            }
        }
    }
    None
}

/// Extract and verify the session from a request's `Cookie` header.
/// Missing cookie, like any verification failure, is simply `None`.
pub fn session_from_headers(headers: &HeaderMap, key: &str) -> Option<SessionPayload> {
    let token = parse_cookie(headers, SESSION_COOKIE)?;
    verify(&token, key)
}
