//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::domain::repository::{AccountRepository, SessionRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_session;

/// Routes over an existing state, so other routers can share it
pub fn auth_routes<R>(state: AuthAppState<R>) -> Router
where
    R: AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let protected: Router<AuthAppState<R>> = Router::new()
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session::<R>,
        ));

    Router::new()
        .route("/login", post(handlers::login::<R>))
        .route("/logout", post(handlers::logout::<R>))
        .merge(protected)
        .with_state(state)
}
