//! Session token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the user id (`sub`), role, issue and expiry
//! times and the configured issuer. They are stateless: there is no
//! revocation list, so a token stays valid until it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bookstore_core::{AuthResponse, Role, UserId};

use crate::config::TokenConfig;
use crate::models::User;

/// Claims stored in a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (subject)
    pub sub: String,
    /// Role at issue time. Informational; the gate re-reads the role.
    pub role: Role,
    /// Issued-at timestamp
    pub iat: i64,
    /// Expiry timestamp
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

/// Identity extracted from a valid token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedToken {
    pub user_id: UserId,
    pub role: Role,
}

/// Token errors.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("token expired")]
    Expired,

    #[error("token generation failed: {0}")]
    Generation(String),
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    issuer: String,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Build a token service from configuration.
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: i64::try_from(config.ttl_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
            issuer: config.issuer.clone(),
        }
    }

    /// Issue a token valid from now for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Generation` if signing fails.
    pub fn issue(&self, user_id: UserId, role: Role) -> Result<String, TokenError> {
        self.issue_at(user_id, role, Utc::now())
    }

    /// Issue a token as if it were created at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Generation` if signing fails.
    pub fn issue_at(
        &self,
        user_id: UserId,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Generation("expiry out of range".to_owned()))?;
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Issue a token for `user` and build the signup/login response.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Generation` if signing fails.
    pub fn session(&self, user: &User) -> Result<AuthResponse, TokenError> {
        Ok(AuthResponse {
            token: self.issue(user.id, user.role)?,
            user: user.profile(),
        })
    }

    /// Verify a token and extract its identity.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` past expiry (no leeway) and
    /// `TokenError::Invalid` for malformed, tampered or foreign tokens.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            }
        })?;

        let user_id = data
            .claims
            .sub
            .parse::<UserId>()
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        Ok(VerifiedToken {
            user_id,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn service() -> TokenService {
        TokenService::new(&TokenConfig::new(SecretString::from(
            "kP9#vL2$qW7!zR4@mN8&xT1*bY6^cF3%",
        )))
    }

    /// Flip one character inside the signature segment.
    fn tamper(token: &str) -> String {
        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.as_bytes().to_vec();
        let idx = sig_start + 5;
        bytes[idx] = if bytes[idx] == b'A' { b'B' } else { b'A' };
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = service();
        let token = tokens.issue(UserId::new(7), Role::Admin).unwrap();
        let verified = tokens.verify(&token).unwrap();
        assert_eq!(verified.user_id, UserId::new(7));
        assert_eq!(verified.role, Role::Admin);
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service();
        let issued = Utc::now() - Duration::seconds(3601 + 5);
        let token = tokens.issue_at(UserId::new(1), Role::User, issued).unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_token_near_expiry_still_valid() {
        let tokens = service();
        let issued = Utc::now() - Duration::seconds(3600 - 30);
        let token = tokens.issue_at(UserId::new(1), Role::User, issued).unwrap();
        assert!(tokens.verify(&token).is_ok());
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let tokens = service();
        let token = tokens.issue(UserId::new(1), Role::User).unwrap();
        assert!(matches!(
            tokens.verify(&tamper(&token)),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let mut config = TokenConfig::new(SecretString::from("kP9#vL2$qW7!zR4@mN8&xT1*bY6^cF3%"));
        config.issuer = "elsewhere".to_string();
        let foreign = TokenService::new(&config)
            .issue(UserId::new(1), Role::Admin)
            .unwrap();
        assert!(service().verify(&foreign).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            service().verify("not-a-token"),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_session_carries_profile() {
        let user = User {
            id: UserId::new(3),
            email: bookstore_core::Email::parse("ada@example.com").unwrap(),
            display_name: "Ada".to_owned(),
            role: Role::Admin,
            created_at: Utc::now(),
        };
        let tokens = service();

        let session = tokens.session(&user).unwrap();
        assert!(session.user.is_admin);
        assert_eq!(tokens.verify(&session.token).unwrap().user_id, user.id);
    }
}
