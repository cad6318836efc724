pub mod gate;
pub mod token;

pub use gate::{gated, role_gate, AuthUser, RoleGate, ANY_MEMBER, LANDLORD_ONLY, TENANT_ONLY};
pub use token::{SessionClaims, TokenError, TokenService, VerificationClaims};

use crate::utils::{ApiError, ApiResult, Config};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// Account role; admin passes every role check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Landlord,
    Tenant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Landlord => "landlord",
            Role::Tenant => "tenant",
        }
    }

    pub fn satisfies(&self, allowed: &[Role]) -> bool {
        *self == Role::Admin || allowed.contains(self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Password hashing plus token issuance
pub struct AuthService {
    tokens: Arc<TokenService>,
    argon2: Argon2<'static>,
}

impl AuthService {
    pub fn new(config: &Config) -> Self {
        Self {
            tokens: Arc::new(TokenService::new(
                &config.jwt.secret,
                Duration::minutes(config.jwt.expiration_minutes),
            )),
            argon2: Argon2::default(),
        }
    }

    pub fn tokens(&self) -> Arc<TokenService> {
        self.tokens.clone()
    }

    pub fn hash_password(&self, password: &str) -> ApiResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| ApiError::internal_error("Failed to hash password").with_error(err.to_string()))
    }

    /// False for a wrong password or an unreadable stored hash
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        PasswordHash::new(stored_hash)
            .map(|parsed| self.argon2.verify_password(password.as_bytes(), &parsed).is_ok())
            .unwrap_or(false)
    }

    /// Signed login token for an account
    pub fn session_token(&self, user_id: i64, role: Role, verified: bool) -> ApiResult<String> {
        let claims = self.tokens.session_claims(user_id, role, verified);
        Ok(self.tokens.issue(&claims)?)
    }

    /// Signed email-verification token for an account
    pub fn verification_token(&self, user_id: i64) -> ApiResult<String> {
        let claims = self.tokens.verification_claims(user_id);
        Ok(self.tokens.issue(&claims)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService {
            tokens: Arc::new(TokenService::new("secret", Duration::minutes(5))),
            argon2: Argon2::default(),
        }
    }

    #[test]
    fn admin_satisfies_any_role_set() {
        assert!(Role::Admin.satisfies(&[]));
        assert!(Role::Admin.satisfies(LANDLORD_ONLY));
        assert!(Role::Tenant.satisfies(ANY_MEMBER));
        assert!(!Role::Tenant.satisfies(LANDLORD_ONLY));
        assert!(!Role::Landlord.satisfies(TENANT_ONLY));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Landlord).unwrap(), "\"landlord\"");
        assert_eq!(serde_json::from_str::<Role>("\"admin\"").unwrap(), Role::Admin);
    }

    #[test]
    fn password_hash_verifies() {
        let auth = service();
        let hash = auth.hash_password("Str0ng!Pass").unwrap();
        assert_ne!(hash, "Str0ng!Pass");
        assert!(auth.verify_password("Str0ng!Pass", &hash));
        assert!(!auth.verify_password("wrong", &hash));
        assert!(!auth.verify_password("Str0ng!Pass", "not-a-phc-string"));
    }

    #[test]
    fn session_token_carries_role() {
        let auth = service();
        let token = auth.session_token(9, Role::Landlord, true).unwrap();
        let claims: SessionClaims = auth.tokens().verify(&token).unwrap();
        assert_eq!(claims.user_id, 9);
        assert_eq!(claims.role, Role::Landlord);
        assert!(claims.verified);
    }
}
