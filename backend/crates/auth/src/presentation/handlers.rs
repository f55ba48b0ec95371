//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::IntoResponse;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::cookie::set_cookie_header;
use platform::password::CredentialVerifier;

use crate::application::authenticator::AnyAuthenticator;
use crate::application::config::AuthConfig;
use crate::application::{
    PasswordResetUseCase, SignInInput, SignInUseCase, SignOutUseCase, SignUpInput, SignUpUseCase,
    UpdatePasswordInput,
};
use crate::domain::repository::{AuthStore, UserRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthError;
use crate::presentation::dto::{
    CreateUserRequest, EmptyResponse, LoginForm, PasswordUpdatedResponse, ResetTokenForm,
    ResetTokenResponse, StatsResponse, StatusResponse, UpdatePasswordForm, UpdateUserRequest,
    UserResponse,
};
use crate::presentation::middleware::CurrentUser;

/// Shared state for auth handlers
pub struct AuthAppState<R> {
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    /// `None` when no `AUTH_TYPE` is configured
    pub authenticator: Option<Arc<AnyAuthenticator<R>>>,
    pub verifier: Arc<dyn CredentialVerifier>,
}

impl<R> Clone for AuthAppState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
            authenticator: self.authenticator.clone(),
            verifier: self.verifier.clone(),
        }
    }
}

impl<R> AuthAppState<R>
where
    R: AuthStore,
{
    /// Build the state, resolving the authenticator once
    pub fn new(repo: Arc<R>, config: AuthConfig, verifier: Arc<dyn CredentialVerifier>) -> Self {
        let authenticator =
            AnyAuthenticator::from_config(&config, repo.clone(), verifier.clone()).map(Arc::new);

        Self {
            repo,
            config: Arc::new(config),
            authenticator,
            verifier,
        }
    }

    fn session_authenticator(&self) -> Result<Arc<AnyAuthenticator<R>>, AuthError> {
        self.authenticator
            .clone()
            .filter(|auth| auth.auth_type().supports_sessions())
            .ok_or(AuthError::SessionsUnsupported)
    }
}

fn not_found() -> AppError {
    AppError::from_kind(ErrorKind::NotFound)
}

fn wrong_format(rejection: JsonRejection) -> AppError {
    tracing::debug!(error = %rejection, "Rejected request body");
    AppError::bad_request("Wrong format")
}

// ============================================================================
// Index
// ============================================================================

/// GET /api/v1/status
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse { status: "OK" })
}

/// GET /api/v1/stats
pub async fn stats<R>(State(state): State<AuthAppState<R>>) -> Result<Json<StatsResponse>, AppError>
where
    R: AuthStore,
{
    let users = state.repo.count().await?;
    Ok(Json(StatsResponse { users }))
}

/// GET /api/v1/unauthorized
pub async fn unauthorized() -> AppError {
    AppError::from_kind(ErrorKind::Unauthorized)
}

/// GET /api/v1/forbidden
pub async fn forbidden() -> AppError {
    AppError::from_kind(ErrorKind::Forbidden)
}

/// Unknown route
pub async fn fallback() -> AppError {
    not_found()
}

// ============================================================================
// Users
// ============================================================================

/// GET /api/v1/users
pub async fn list_users<R>(
    State(state): State<AuthAppState<R>>,
) -> Result<Json<Vec<UserResponse>>, AppError>
where
    R: AuthStore,
{
    let users = state.repo.all().await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// GET /api/v1/users/{user_id}
///
/// `me` is the authenticated user.
pub async fn get_user<R>(
    State(state): State<AuthAppState<R>>,
    current: Option<CurrentUser>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, AppError>
where
    R: AuthStore,
{
    if user_id == "me" {
        let CurrentUser(user) = current.ok_or_else(not_found)?;
        return Ok(Json(UserResponse::from(&user)));
    }

    let user_id: UserId = user_id.parse().map_err(|_| not_found())?;
    let user = state.repo.find_by_id(&user_id).await?.ok_or_else(not_found)?;
    Ok(Json(UserResponse::from(&user)))
}

/// POST /api/v1/users
pub async fn create_user<R>(
    State(state): State<AuthAppState<R>>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: AuthStore,
{
    let Json(req) = body.map_err(wrong_format)?;
    let use_case = SignUpUseCase::new(state.repo.clone(), state.verifier.clone());

    let user = use_case
        .execute(SignUpInput {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// PUT /api/v1/users/{user_id}
pub async fn update_user<R>(
    State(state): State<AuthAppState<R>>,
    current: Option<CurrentUser>,
    Path(user_id): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError>
where
    R: AuthStore,
{
    let mut user = if user_id == "me" {
        current.map(|CurrentUser(user)| user).ok_or_else(not_found)?
    } else {
        let user_id: UserId = user_id.parse().map_err(|_| not_found())?;
        state.repo.find_by_id(&user_id).await?.ok_or_else(not_found)?
    };

    let Json(req) = body.map_err(wrong_format)?;
    let first_name = req.first_name.or_else(|| user.first_name.clone());
    let last_name = req.last_name.or_else(|| user.last_name.clone());
    user.set_name(first_name, last_name);
    UserRepository::save(state.repo.as_ref(), &user).await?;

    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /api/v1/users/{user_id}
pub async fn delete_user<R>(
    State(state): State<AuthAppState<R>>,
    Path(user_id): Path<String>,
) -> Result<Json<EmptyResponse>, AppError>
where
    R: AuthStore,
{
    let user_id: UserId = user_id.parse().map_err(|_| not_found())?;
    if !UserRepository::remove(state.repo.as_ref(), &user_id).await? {
        return Err(not_found());
    }

    tracing::info!(user_id = %user_id, "User deleted");
    Ok(Json(EmptyResponse {}))
}

// ============================================================================
// Session
// ============================================================================

/// POST /api/v1/auth_session/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError>
where
    R: AuthStore,
{
    let authenticator = state.session_authenticator()?;
    let use_case = SignInUseCase::new(state.repo.clone(), authenticator, state.verifier.clone());

    let output = use_case
        .execute(SignInInput {
            email: form.email,
            password: form.password,
        })
        .await?;

    let cookie = set_cookie_header(&state.config.cookie_config(), &output.session_id);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse::from(&output.user)),
    ))
}

/// DELETE /api/v1/auth_session/logout
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError>
where
    R: AuthStore,
{
    let authenticator = state.session_authenticator().map_err(|_| not_found())?;
    let use_case = SignOutUseCase::new(state.repo.clone(), authenticator);

    use_case.execute(&headers).await.map_err(|e| match e {
        AuthError::SessionNotFound => not_found(),
        other => AppError::from(other),
    })?;

    let clear = HeaderValue::from_str(&state.config.cookie_config().build_delete_cookie())
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    Ok(([(header::SET_COOKIE, clear)], Json(EmptyResponse {})))
}

// ============================================================================
// Password Reset
// ============================================================================

/// POST /api/v1/reset_password
pub async fn reset_password_token<R>(
    State(state): State<AuthAppState<R>>,
    Form(form): Form<ResetTokenForm>,
) -> Result<Json<ResetTokenResponse>, AppError>
where
    R: AuthStore,
{
    let use_case = PasswordResetUseCase::new(state.repo.clone(), state.verifier.clone());
    let (user, reset_token) = use_case.request_token(form.email).await?;

    Ok(Json(ResetTokenResponse {
        email: user.email.as_str().to_string(),
        reset_token,
    }))
}

/// PUT /api/v1/reset_password
pub async fn update_password<R>(
    State(state): State<AuthAppState<R>>,
    Form(form): Form<UpdatePasswordForm>,
) -> Result<Json<PasswordUpdatedResponse>, AppError>
where
    R: AuthStore,
{
    let use_case = PasswordResetUseCase::new(state.repo.clone(), state.verifier.clone());
    let user = use_case
        .update_password(UpdatePasswordInput {
            email: form.email,
            reset_token: form.reset_token,
            new_password: form.new_password,
        })
        .await?;

    Ok(Json(PasswordUpdatedResponse {
        email: user.email.as_str().to_string(),
        message: "Password updated",
    }))
}
