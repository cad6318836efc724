use crate::{
    auth::{token::SessionClaims, Role, TokenError, TokenService},
    state::AppState,
    utils::ApiError,
};
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::MethodRouter,
};
use std::sync::Arc;

pub const ANY_MEMBER: &[Role] = &[Role::Tenant, Role::Landlord];
pub const LANDLORD_ONLY: &[Role] = &[Role::Landlord];
pub const TENANT_ONLY: &[Role] = &[Role::Tenant];

/// Identity attached to a request once the gate has let it through
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: Role,
    pub verified: bool,
}

impl From<SessionClaims> for AuthUser {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role,
            verified: claims.verified,
        }
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Gate configuration: verifier plus the roles a route admits
#[derive(Clone)]
pub struct RoleGate {
    tokens: Arc<TokenService>,
    allowed: &'static [Role],
}

impl RoleGate {
    pub fn new(tokens: Arc<TokenService>, allowed: &'static [Role]) -> Self {
        Self { tokens, allowed }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => {
                ApiError::authentication_error("The token has expired. Please log in again")
            }
            TokenError::NotYetValid => ApiError::authentication_error(
                "The token is not yet active. Please check your system time",
            ),
            TokenError::InvalidSignature | TokenError::Malformed(_) => {
                ApiError::authentication_error("Invalid token. Please log in or provide a valid token")
            }
            TokenError::Signing(_) => ApiError::internal_error("Failed to generate token"),
        }
        .with_error(err.to_string())
    }
}

fn role_list(roles: &[Role]) -> String {
    let names: Vec<&str> = roles.iter().map(|role| role.as_str()).collect();
    format!("[{}]", names.join(", "))
}

/// Middleware: verify the bearer token and enforce the route's role set
pub async fn role_gate(
    State(gate): State<RoleGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).ok_or_else(|| {
        ApiError::authentication_error("Invalid token")
            .with_error("Token is invalid or expired, please login to get a new token")
    })?;

    let claims: SessionClaims = gate.tokens.verify(token).map_err(|err| {
        tracing::warn!("Rejected token on {}: {}", request.uri().path(), err);
        ApiError::from(err)
    })?;

    if !claims.role.satisfies(gate.allowed) {
        return Err(ApiError::authorization_error("Access denied").with_error(format!(
            "User role must be one of {} and you are {}",
            role_list(gate.allowed),
            claims.role
        )));
    }

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Wraps `route` so it only runs for callers holding one of `allowed`.
pub fn gated(
    state: &AppState,
    allowed: &'static [Role],
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    route.layer(from_fn_with_state(
        RoleGate::new(state.auth_service.tokens(), allowed),
        role_gate,
    ))
}
