//! Auth Router

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::domain::repository::AuthStore;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::filter_request;

/// Create the `/api/v1` router for any store implementation
///
/// Every route, the fallback included, runs behind [`filter_request`].
pub fn auth_router<R>(state: AuthAppState<R>) -> Router
where
    R: AuthStore,
{
    let api = Router::new()
        .route("/status", get(handlers::status))
        .route("/stats", get(handlers::stats::<R>))
        .route("/unauthorized", get(handlers::unauthorized))
        .route("/forbidden", get(handlers::forbidden))
        .route(
            "/users",
            get(handlers::list_users::<R>).post(handlers::create_user::<R>),
        )
        .route(
            "/users/{user_id}",
            get(handlers::get_user::<R>)
                .put(handlers::update_user::<R>)
                .delete(handlers::delete_user::<R>),
        )
        .route("/auth_session/login", post(handlers::login::<R>))
        .route("/auth_session/logout", delete(handlers::logout::<R>))
        .route(
            "/reset_password",
            post(handlers::reset_password_token::<R>).put(handlers::update_password::<R>),
        );

    Router::new()
        .nest("/api/v1", api)
        .fallback(handlers::fallback)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            filter_request::<R>,
        ))
        .with_state(state)
}
