//! Single-password gate for the admin area.
//!
//! The configured password is hashed once at startup; a successful login
//! yields a signed session token that the web layer keeps in a cookie.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const ADMIN_SUBJECT: &str = "admin";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid password")]
    InvalidPassword,
    #[error("invalid session token: {0}")]
    InvalidToken(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
}

pub struct AdminGate {
    password_hash: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
    session_ttl: Duration,
}

impl AdminGate {
    pub fn new(password: &str, jwt_secret: &str, session_ttl: Duration) -> Result<Self, AuthError> {
        let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
            .map_err(|e| AuthError::Hash(e.to_string()))?;
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hash(e.to_string()))?
            .to_string();

        Ok(Self {
            password_hash,
            encoding: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(jwt_secret.as_bytes()),
            session_ttl,
        })
    }

    pub fn verify_password(&self, candidate: &str) -> Result<(), AuthError> {
        let parsed =
            PasswordHash::new(&self.password_hash).map_err(|e| AuthError::Hash(e.to_string()))?;
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .map_err(|_| AuthError::InvalidPassword)
    }

    /// Check the password and issue a session token.
    pub fn login(&self, candidate: &str) -> Result<String, AuthError> {
        self.verify_password(candidate)?;
        self.issue_token()
    }

    pub fn issue_token(&self) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = AdminClaims {
            sub: ADMIN_SUBJECT.to_string(),
            iat: now.timestamp().max(0) as u64,
            exp: (now + self.session_ttl).timestamp().max(0) as u64,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<AdminClaims, AuthError> {
        let data = decode::<AdminClaims>(token, &self.decoding, &Validation::default())
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        if data.claims.sub != ADMIN_SUBJECT {
            return Err(AuthError::InvalidToken("unexpected subject".into()));
        }
        Ok(data.claims)
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AdminGate {
        AdminGate::new("campfire", "test-secret", Duration::hours(1)).unwrap()
    }

    #[test]
    fn login_with_right_password_issues_valid_token() {
        let gate = gate();
        let token = gate.login("campfire").unwrap();
        let claims = gate.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_password_is_rejected() {
        assert!(matches!(gate().login("marshmallow"), Err(AuthError::InvalidPassword)));
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let other = AdminGate::new("campfire", "other-secret", Duration::hours(1)).unwrap();
        let token = other.issue_token().unwrap();
        assert!(matches!(
            gate().validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let gate = AdminGate::new("campfire", "test-secret", Duration::hours(-2)).unwrap();
        let token = gate.issue_token().unwrap();
        assert!(gate.validate_token(&token).is_err());
    }
}
