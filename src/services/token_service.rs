//! HS256 JSON Web Tokens.
//!
//! Only the one algorithm is accepted; tokens carrying any other `alg` header
//! are rejected before the claims are looked at.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const JWT_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a string.
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i64, username: &str, now: i64, ttl_hours: i64) -> Self {
        Self {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now,
            exp: now + ttl_hours * 3600,
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("unsupported token algorithm")]
    UnsupportedAlgorithm,
    #[error("token signature mismatch")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("token encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct JwtHeader {
    alg: String,
}

fn mac_for(secret: &str) -> HmacSha256 {
    <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length")
}

pub fn issue_token(secret: &str, claims: &Claims) -> Result<String, TokenError> {
    let header = URL_SAFE_NO_PAD.encode(JWT_HEADER);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
    let signing_input = format!("{}.{}", header, payload);

    let mut mac = mac_for(secret);
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", signing_input, signature))
}

pub fn verify_token(secret: &str, token: &str, now: i64) -> Result<Claims, TokenError> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    let [header, payload, signature] = parts.as_slice() else {
        return Err(TokenError::Malformed);
    };

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| TokenError::Malformed)?;
    let header: JwtHeader =
        serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
    if header.alg != "HS256" {
        return Err(TokenError::UnsupportedAlgorithm);
    }

    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| TokenError::Malformed)?;
    let mut mac = mac_for(secret);
    mac.update(format!("{}.{}", parts[0], payload).as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| TokenError::BadSignature)?;

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| TokenError::Malformed)?;
    let claims: Claims =
        serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::Malformed)?;

    if claims.exp <= now {
        return Err(TokenError::Expired);
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";
    const NOW: i64 = 1_760_000_000;

    fn token_for(user_id: i64) -> String {
        issue_token(SECRET, &Claims::new(user_id, "alice", NOW, 72)).unwrap()
    }

    #[test]
    fn issued_token_verifies() {
        let claims = verify_token(SECRET, &token_for(7), NOW + 60).unwrap();
        assert_eq!(claims.user_id(), Some(7));
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp, NOW + 72 * 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let result = verify_token("other-secret", &token_for(7), NOW);
        assert!(matches!(result, Err(TokenError::BadSignature)));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let token = token_for(7);
        let parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&Claims::new(1, "mallory", NOW, 72)).unwrap(),
        );
        let tampered = format!("{}.{}.{}", parts[0], forged, parts[2]);

        assert!(matches!(
            verify_token(SECRET, &tampered, NOW),
            Err(TokenError::BadSignature)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = token_for(7);
        let at_expiry = NOW + 72 * 3600;
        assert!(matches!(
            verify_token(SECRET, &token, at_expiry),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn alg_none_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD
            .encode(serde_json::to_vec(&Claims::new(1, "mallory", NOW, 72)).unwrap());
        let token = format!("{}.{}.", header, payload);

        assert!(matches!(
            verify_token(SECRET, &token, NOW),
            Err(TokenError::UnsupportedAlgorithm)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        for token in ["", "abc", "a.b", "a.b.c.d", "!!.??.**"] {
            assert!(
                matches!(verify_token(SECRET, token, NOW), Err(TokenError::Malformed)),
                "token {:?}",
                token
            );
        }
    }
}
