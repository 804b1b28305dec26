//! Bearer tokens: an encrypted claims blob inside a signed, expiring
//! envelope. Verification is fail-closed; callers only ever learn
//! valid-or-not.

use crate::auth::crypto::SecretCipher;
use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_TTL_SECS: i64 = 3600;

/// Envelope claims: the encrypted payload plus issue/expiry stamps.
#[derive(Debug, Serialize, Deserialize)]
struct EnvelopeClaims {
    data: String,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    cipher: SecretCipher,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(crypto_key: [u8; 32], signing_secret: &str, ttl_secs: i64) -> Self {
        TokenService {
            cipher: SecretCipher::new(crypto_key),
            encoding_key: EncodingKey::from_secret(signing_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(signing_secret.as_bytes()),
            validation: Validation::default(),
            ttl_secs,
        }
    }

    /// The symmetric cipher, shared with the list handler's response
    /// encryption.
    pub fn cipher(&self) -> &SecretCipher {
        &self.cipher
    }

    /// Issue an opaque token wrapping `payload`, valid for the service TTL.
    pub fn issue(&self, payload: &Value) -> Result<String, AppError> {
        let plaintext =
            serde_json::to_string(payload).map_err(|e| AppError::Crypto(e.to_string()))?;
        let data = self.cipher.encrypt(&plaintext);
        let now = chrono::Utc::now().timestamp();
        let claims = EnvelopeClaims {
            data,
            iat: now,
            exp: now + self.ttl_secs,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Crypto(e.to_string()))
    }

    /// Verify the envelope and unwrap the payload. Bad signature, expiry,
    /// malformed structure, bad hex, decrypt failure, and malformed JSON all
    /// collapse to `None`; callers cannot tell the failure modes apart.
    pub fn verify(&self, token: &str) -> Option<Value> {
        let decoded =
            decode::<EnvelopeClaims>(token, &self.decoding_key, &self.validation).ok()?;
        let plaintext = self.cipher.decrypt(&decoded.claims.data)?;
        serde_json::from_str(&plaintext).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KEY: [u8; 32] = [3u8; 32];
    const SECRET: &str = "test-signing-secret";

    #[test]
    fn issue_then_verify_returns_the_payload() {
        let svc = TokenService::new(KEY, SECRET, DEFAULT_TTL_SECS);
        let payload = json!({ "user": "alice", "role": "admin" });
        let token = svc.issue(&payload).unwrap();
        assert_eq!(svc.verify(&token), Some(payload));
    }

    #[test]
    fn tampered_and_expired_tokens_are_indistinguishable() {
        let svc = TokenService::new(KEY, SECRET, DEFAULT_TTL_SECS);
        let token = svc.issue(&json!({ "user": "alice" })).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert_eq!(svc.verify(&tampered), None);

        // Past the validator's leeway, so the envelope reads as expired.
        let expiring = TokenService::new(KEY, SECRET, -600);
        let expired = expiring.issue(&json!({ "user": "alice" })).unwrap();
        assert_eq!(svc.verify(&expired), None);
    }

    #[test]
    fn wrong_signing_secret_is_rejected() {
        let svc = TokenService::new(KEY, SECRET, DEFAULT_TTL_SECS);
        let other = TokenService::new(KEY, "other-secret", DEFAULT_TTL_SECS);
        let token = other.issue(&json!({ "user": "alice" })).unwrap();
        assert_eq!(svc.verify(&token), None);
    }

    #[test]
    fn two_tokens_for_one_payload_differ() {
        let svc = TokenService::new(KEY, SECRET, DEFAULT_TTL_SECS);
        let payload = json!({ "user": "alice" });
        assert_ne!(svc.issue(&payload).unwrap(), svc.issue(&payload).unwrap());
    }
}
