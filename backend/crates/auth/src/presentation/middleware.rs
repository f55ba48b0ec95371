//! Auth Middleware
//!
//! Request filter run before every route:
//! - no authenticator configured, or path excluded: pass through
//! - neither `Authorization` header nor session cookie: 401
//! - credentials that resolve to nobody: 403
//! - otherwise the user is attached as [`CurrentUser`]

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{OptionalFromRequestParts, State};
use axum::http::{Request, header};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};

use crate::application::authenticator::Authenticator;
use crate::domain::entity::user::User;
use crate::domain::repository::AuthStore;
use crate::presentation::handlers::AuthAppState;

/// Authenticated user of the current request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> OptionalFromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentUser>().cloned())
    }
}

/// Authenticate the request with the configured authenticator
pub async fn filter_request<R>(
    State(state): State<AuthAppState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    R: AuthStore,
{
    let Some(auth) = state.authenticator.clone() else {
        return next.run(req).await;
    };

    if !auth.require_auth(req.uri().path()) {
        return next.run(req).await;
    }

    // A header that is present but unreadable still counts as credentials
    let headers = req.headers();
    if !headers.contains_key(header::AUTHORIZATION) && auth.session_cookie(headers).is_none() {
        return AppError::from_kind(ErrorKind::Unauthorized).into_response();
    }

    let Some(user) = auth.current_user(req.headers()).await else {
        return AppError::from_kind(ErrorKind::Forbidden).into_response();
    };

    tracing::debug!(user_id = %user.id, path = %req.uri().path(), "Request authenticated");
    req.extensions_mut().insert(CurrentUser(user));

    next.run(req).await
}
