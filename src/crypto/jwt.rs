// HS256 session tokens issued by the OAuth provider.
//
// Claims follow the Supabase shape: `sub`, `exp`, `email` and
// `user_metadata.preferred_username`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::fmt;

use crate::domain::model::User;

type HmacSha256 = Hmac<Sha256>;

const JWT_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Malformed,
    BadSignature,
    Expired,
    MissingSubject,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            TokenError::Malformed => "malformed token",
            TokenError::BadSignature => "invalid token signature",
            TokenError::Expired => "token expired",
            TokenError::MissingSubject => "token has no subject",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for TokenError {}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
    exp: u64,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    user_name: Option<String>,
}

fn mac_for(secret: &str, signing_input: &str) -> Result<HmacSha256, TokenError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::BadSignature)?;
    mac.update(signing_input.as_bytes());
    Ok(mac)
}

/// Verifies signature and expiry, returning the identity carried by the token.
pub fn verify_token(token: &str, secret: &str, now_unix: u64) -> Result<User, TokenError> {
    let mut parts = token.trim().split('.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };

    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| TokenError::Malformed)?;
    mac_for(secret, &format!("{header}.{payload}"))?
        .verify_slice(&signature)
        .map_err(|_| TokenError::BadSignature)?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| TokenError::Malformed)?;
    let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

    if now_unix > claims.exp {
        return Err(TokenError::Expired);
    }

    let id = claims
        .sub
        .filter(|s| !s.trim().is_empty())
        .ok_or(TokenError::MissingSubject)?;

    Ok(User {
        id,
        email: claims.email.filter(|e| !e.trim().is_empty()),
        preferred_username: claims
            .user_metadata
            .preferred_username
            .or(claims.user_metadata.user_name),
    })
}

/// Signs a token for `user` valid for `ttl_secs` from `now_unix`.
pub fn sign_token(
    user: &User,
    secret: &str,
    now_unix: u64,
    ttl_secs: u64,
) -> Result<String, TokenError> {
    let claims = serde_json::json!({
        "sub": user.id,
        "email": user.email,
        "iat": now_unix,
        "exp": now_unix + ttl_secs,
        "user_metadata": { "preferred_username": user.preferred_username },
    });
    let header_b64 = URL_SAFE_NO_PAD.encode(JWT_HEADER.as_bytes());
    let payload_b64 = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    let signing_input = format!("{header_b64}.{payload_b64}");
    let signature = mac_for(secret, &signing_input)?.finalize().into_bytes();
    Ok(format!(
        "{signing_input}.{}",
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";
    const NOW: u64 = 1_700_000_000;

    fn alice() -> User {
        User {
            id: "user-alice".to_string(),
            email: Some("alice@example.com".to_string()),
            preferred_username: Some("alice".to_string()),
        }
    }

    #[test]
    fn signed_token_verifies() {
        let token = sign_token(&alice(), SECRET, NOW, 3600).unwrap();
        assert_eq!(verify_token(&token, SECRET, NOW + 10), Ok(alice()));
    }

    #[test]
    fn rejects_wrong_secret_and_expired() {
        let token = sign_token(&alice(), SECRET, NOW, 3600).unwrap();
        assert_eq!(
            verify_token(&token, "other", NOW),
            Err(TokenError::BadSignature)
        );
        assert_eq!(
            verify_token(&token, SECRET, NOW + 3601),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn rejects_tampered_payload() {
        let token = sign_token(&alice(), SECRET, NOW, 3600).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(br#"{"sub":"admin","exp":9999999999}"#);
        parts[1] = &forged;
        assert_eq!(
            verify_token(&parts.join("."), SECRET, NOW),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn rejects_malformed_and_subjectless() {
        assert_eq!(verify_token("abc", SECRET, NOW), Err(TokenError::Malformed));
        assert_eq!(verify_token("a.b.c.d", SECRET, NOW), Err(TokenError::Malformed));

        let nobody = User {
            id: "   ".to_string(),
            email: None,
            preferred_username: None,
        };
        let token = sign_token(&nobody, SECRET, NOW, 60).unwrap();
        assert_eq!(
            verify_token(&token, SECRET, NOW),
            Err(TokenError::MissingSubject)
        );
    }
}
