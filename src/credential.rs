//! Credential Issuer (C7 — §4.8): mints and validates the access/refresh
//! token pair. Claim structs follow the same `serde`-derive idiom used
//! elsewhere in this crate; signing uses `jsonwebtoken` (HS256 by
//! default — asymmetric keys are a drop-in swap, key rotation is
//! explicitly a non-goal per §4.8).

use {
    crate::IamError,
    jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation},
    serde::{Deserialize, Serialize},
    sha2::{Digest, Sha256},
    uuid::Uuid,
};

/// Wraps the HMAC secret used to both sign and verify tokens.
#[derive(Clone)]
pub struct SigningKey {
    secret: Vec<u8>,
}

impl SigningKey {
    pub fn new<S: Into<Vec<u8>>>(secret: S) -> Self {
        Self { secret: secret.into() }
    }

    fn encoding(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.secret)
    }

    fn decoding(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.secret)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AccessClaims {
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub username: String,
    pub is_root: bool,
    pub session_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RefreshClaims {
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub session_id: Option<Uuid>,
    pub token_family: Uuid,
    pub iat: i64,
    pub exp: i64,
}

fn validation() -> Validation {
    let mut v = Validation::new(Algorithm::HS256);
    v.validate_exp = true;
    v
}

pub fn issue_access_token(key: &SigningKey, claims: &AccessClaims) -> Result<String, IamError> {
    encode(&Header::new(Algorithm::HS256), claims, &key.encoding()).map_err(|e| IamError::internal(e.to_string()))
}

pub fn issue_refresh_token(key: &SigningKey, claims: &RefreshClaims) -> Result<String, IamError> {
    encode(&Header::new(Algorithm::HS256), claims, &key.encoding()).map_err(|e| IamError::internal(e.to_string()))
}

pub fn decode_access_token(key: &SigningKey, token: &str) -> Result<AccessClaims, IamError> {
    decode::<AccessClaims>(token, &key.decoding(), &validation())
        .map(|data| data.claims)
        .map_err(|e| IamError::authentication(e.to_string()))
}

pub fn decode_refresh_token(key: &SigningKey, token: &str) -> Result<RefreshClaims, IamError> {
    decode::<RefreshClaims>(token, &key.decoding(), &validation())
        .map(|data| data.claims)
        .map_err(|e| IamError::authentication(e.to_string()))
}

/// The key into the Revocation Store and Session Store (§4.8): `SHA-256`
/// of the raw token string, hex-encoded.
pub fn token_hash(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().fold(String::with_capacity(digest.len() * 2), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{:02x}", b);
        acc
    })
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    fn sample_access_claims() -> AccessClaims {
        AccessClaims {
            user_id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            username: "alice".to_string(),
            is_root: false,
            session_id: Some(Uuid::new_v4()),
            role_id: Some(Uuid::new_v4()),
            iat: 1_700_000_000,
            exp: 1_700_000_900,
        }
    }

    #[test_log::test]
    fn test_access_token_round_trip() {
        let key = SigningKey::new("test-secret");
        let claims = sample_access_claims();
        let token = issue_access_token(&key, &claims).unwrap();
        let decoded = decode_access_token(&key, &token).unwrap();
        assert_eq!(decoded.user_id, claims.user_id);
        assert_eq!(decoded.username, "alice");
    }

    #[test_log::test]
    fn test_wrong_key_rejected() {
        let key = SigningKey::new("test-secret");
        let other_key = SigningKey::new("different-secret");
        let token = issue_access_token(&key, &sample_access_claims()).unwrap();
        assert!(decode_access_token(&other_key, &token).is_err());
    }

    #[test_log::test]
    fn test_expired_token_rejected() {
        let key = SigningKey::new("test-secret");
        let mut claims = sample_access_claims();
        claims.exp = 1; // 1970, long expired
        let token = issue_access_token(&key, &claims).unwrap();
        assert!(decode_access_token(&key, &token).is_err());
    }

    #[test_log::test]
    fn test_token_hash_is_deterministic_and_distinct() {
        assert_eq!(token_hash("abc"), token_hash("abc"));
        assert_ne!(token_hash("abc"), token_hash("abd"));
        assert_eq!(token_hash("abc").len(), 64);
    }
}
