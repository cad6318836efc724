use crate::{
    auth::{AuthUser, TokenError, VerificationClaims},
    db::users::UserRepository,
    handlers::non_empty,
    mail::{verification_email, verification_link},
    models::{
        CreateUserRequest, LoginRequest, LoginToken, NewUser, User, UserFilter, UserSummary,
        VerifyQuery,
    },
    state::AppState,
    utils::{db_error, validate_request, ApiError, ApiJson, ApiPath, ApiQuery, ApiResult, Empty, Envelope},
};
use axum::{extract::State, Extension};

/// List users matching the query filters
pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<UserFilter>,
) -> ApiResult<Envelope<Vec<UserSummary>>> {
    let mut conn = state.db.acquire().await?;
    let users = UserRepository::search(&mut conn, &filter)
        .await
        .map_err(db_error("Unable to list users"))?;
    let users = non_empty(users, "No user(s) found")?;

    Ok(Envelope::ok(
        format!("{} user(s) found", users.len()),
        users.iter().map(UserSummary::from).collect(),
    ))
}

pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Envelope<Vec<UserSummary>>> {
    let mut conn = state.db.acquire().await?;
    let user = UserRepository::find_by_id(&mut conn, id)
        .await?
        .ok_or_else(|| ApiError::not_found_error("No user(s) found"))?;

    Ok(Envelope::ok("User found", vec![UserSummary::from(&user)]))
}

/// The authenticated caller's own account
pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Envelope<Vec<User>>> {
    let mut conn = state.db.acquire().await?;
    let user = UserRepository::find_by_id(&mut conn, auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found_error(format!("User {} not found", auth_user.user_id)))?;

    Ok(Envelope::ok("User found", vec![user]))
}

/// Register an account and email a verification link
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> ApiResult<Envelope<Vec<UserSummary>>> {
    let request = request.trimmed();
    validate_request(&request, "Unable to create user due to validation error(s)")?;

    let mut tx = state.db.begin().await?;

    if UserRepository::find_by_username(&mut tx, &request.username).await?.is_some() {
        return Err(ApiError::conflict_error("Unable to create user")
            .with_error(format!("Username {} is already taken", request.username)));
    }
    if UserRepository::find_by_email(&mut tx, &request.email).await?.is_some() {
        return Err(ApiError::conflict_error("Unable to create user")
            .with_error(format!("Email {} is already registered", request.email)));
    }

    let password_hash = state.auth_service.hash_password(&request.password)?;
    let id = UserRepository::insert(
        &mut tx,
        &NewUser {
            first_name: &request.first_name,
            last_name: &request.last_name,
            username: &request.username,
            email: &request.email,
            password_hash: &password_hash,
            role: request.role(),
        },
    )
    .await
    .map_err(db_error("Unable to create user"))?;

    let user = UserRepository::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| ApiError::internal_error("Unable to create user"))?;

    // The account only persists if the verification email goes out.
    let token = state.auth_service.verification_token(id)?;
    let link = verification_link(&state.config.public_base_url(), &token)?;
    state
        .mailer
        .send(&verification_email(&user.email, &user.first_name, &link))
        .await?;

    tx.commit().await.map_err(db_error("Unable to create user"))?;
    tracing::info!("Registered user {} ({})", id, user.role);

    Ok(Envelope::created(format!("User {id} created"), vec![UserSummary::from(&user)]))
}

/// Exchange credentials for a session token
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Envelope<Vec<LoginToken>>> {
    let missing = request.missing_fields();
    if !missing.is_empty() {
        return Err(ApiError::validation_error("Missing required field(s)").with_errors(missing));
    }

    let mut conn = state.db.acquire().await?;
    let user = match (request.username.as_deref(), request.email.as_deref()) {
        (Some(username), _) if !username.is_empty() => {
            UserRepository::find_by_username(&mut conn, username.trim()).await?
        }
        (_, Some(email)) => UserRepository::find_by_email(&mut conn, email.trim()).await?,
        _ => None,
    };
    drop(conn);

    let password = request.password.as_deref().unwrap_or_default();
    let user = match user {
        Some(user) if state.auth_service.verify_password(password, &user.password) => user,
        _ => {
            tracing::warn!("Rejected login attempt");
            return Err(ApiError::authentication_error("Invalid credentials")
                .with_error("Incorrect username/email or password"));
        }
    };

    if !user.verified {
        let token = state.auth_service.verification_token(user.id)?;
        let link = verification_link(&state.config.public_base_url(), &token)?;
        state
            .mailer
            .send(&verification_email(&user.email, &user.first_name, &link))
            .await?;

        return Err(ApiError::authorization_error(format!(
            "Resent verification email to {}",
            user.email
        ))
        .with_error("Account is not verified"));
    }

    let token = state.auth_service.session_token(user.id, user.role, user.verified)?;
    tracing::info!("User {} logged in", user.id);

    Ok(Envelope::ok("Login successful", vec![LoginToken { token }]))
}

/// Confirm an email address from the link sent at registration
pub async fn verify_email(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<VerifyQuery>,
) -> ApiResult<Empty> {
    let token = query
        .token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::validation_error("Missing token"))?;

    let claims: VerificationClaims = state
        .auth_service
        .tokens()
        .verify(&token)
        .map_err(|err| match err {
            TokenError::Expired => ApiError::authentication_error(
                "The token has expired. Please login again to send another verification email",
            )
            .with_error(err.to_string()),
            other => ApiError::from(other),
        })?;

    let mut tx = state.db.begin().await?;
    if !UserRepository::mark_verified(&mut tx, claims.id)
        .await
        .map_err(db_error("Unable to verify user"))?
    {
        return Err(ApiError::not_found_error(format!("User {} not found", claims.id)));
    }
    tx.commit().await.map_err(db_error("Unable to verify user"))?;

    Ok(Empty::done(format!("User {} has been verified", claims.id)))
}
