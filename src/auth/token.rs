use crate::auth::Role;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind as JwtErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Why a token was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Signature has expired")]
    Expired,
    #[error("The token is not yet valid (nbf)")]
    NotYetValid,
    #[error("Signature verification failed")]
    InvalidSignature,
    #[error("{0}")]
    Malformed(String),
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            JwtErrorKind::ExpiredSignature => TokenError::Expired,
            JwtErrorKind::ImmatureSignature => TokenError::NotYetValid,
            JwtErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// Claims carried by a login session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub user_id: i64,
    pub role: Role,
    pub verified: bool,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
}

/// Claims carried by an email verification link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationClaims {
    pub id: i64,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
}

/// Signs and verifies HS256 tokens with the process-wide secret
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Session claims for `user_id` expiring one TTL from now
    pub fn session_claims(&self, user_id: i64, role: Role, verified: bool) -> SessionClaims {
        let now = Utc::now();
        SessionClaims {
            user_id,
            role,
            verified,
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
            nbf: None,
        }
    }

    /// Verification claims for `user_id` expiring one TTL from now
    pub fn verification_claims(&self, user_id: i64) -> VerificationClaims {
        let now = Utc::now();
        VerificationClaims {
            id: user_id,
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
            nbf: None,
        }
    }

    pub fn issue<C: Serialize>(&self, claims: &C) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|err| TokenError::Signing(err.to_string()))
    }

    /// Checks signature, expiry and not-before, then decodes the claims.
    pub fn verify<C: DeserializeOwned>(&self, token: &str) -> Result<C, TokenError> {
        let data = decode::<C>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", Duration::minutes(60))
    }

    #[test]
    fn session_token_round_trips() {
        let tokens = service();
        let claims = tokens.session_claims(7, Role::Tenant, true);
        let token = tokens.issue(&claims).unwrap();

        let decoded: SessionClaims = tokens.verify(&token).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let tokens = service();
        let mut claims = tokens.session_claims(1, Role::Landlord, true);
        claims.exp = Utc::now().timestamp() - 10;
        let token = tokens.issue(&claims).unwrap();

        assert_eq!(tokens.verify::<SessionClaims>(&token), Err(TokenError::Expired));
    }

    #[test]
    fn future_nbf_is_not_yet_valid() {
        let tokens = service();
        let mut claims = tokens.verification_claims(3);
        claims.nbf = Some(Utc::now().timestamp() + 600);
        let token = tokens.issue(&claims).unwrap();

        assert_eq!(
            tokens.verify::<VerificationClaims>(&token),
            Err(TokenError::NotYetValid)
        );
    }

    #[test]
    fn foreign_secret_fails_signature() {
        let other = TokenService::new("another-secret", Duration::minutes(60));
        let token = other.issue(&other.session_claims(1, Role::Admin, true)).unwrap();

        assert_eq!(
            service().verify::<SessionClaims>(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            service().verify::<SessionClaims>("not.a.token"),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn verification_token_does_not_pass_as_session() {
        let tokens = service();
        let token = tokens.issue(&tokens.verification_claims(5)).unwrap();
        assert!(matches!(
            tokens.verify::<SessionClaims>(&token),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn tokens_with_different_expiries_verify_independently() {
        let tokens = service();
        let live = tokens.issue(&tokens.session_claims(1, Role::Tenant, true)).unwrap();
        let mut stale_claims = tokens.session_claims(2, Role::Tenant, true);
        stale_claims.exp = Utc::now().timestamp() - 1;
        let stale = tokens.issue(&stale_claims).unwrap();

        assert!(tokens.verify::<SessionClaims>(&live).is_ok());
        assert_eq!(tokens.verify::<SessionClaims>(&stale), Err(TokenError::Expired));
        assert!(tokens.verify::<SessionClaims>(&live).is_ok());
    }
}
