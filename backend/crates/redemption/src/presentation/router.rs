//! Redemption Router

use auth::{AuthAppState, KvAuthRepository, require_session};
use auth::domain::repository::{AccountRepository, SessionRepository};
use axum::{Router, middleware, routing::post};
use platform::kv::RedisStore;

use crate::application::config::RedemptionConfig;
use crate::domain::repository::BeneficiaryRepository;
use crate::infra::kv::KvBeneficiaryRepository;
use crate::presentation::handlers::{self, RedemptionAppState};

/// Create the redemption router backed by Redis
///
/// `auth` resolves the bearer session on every route.
pub fn redemption_router(
    auth: AuthAppState<KvAuthRepository<RedisStore>>,
    repo: KvBeneficiaryRepository<RedisStore>,
    config: RedemptionConfig,
) -> Router {
    redemption_router_generic(auth, repo, config)
}

/// Create a generic redemption router for any repository implementation
pub fn redemption_router_generic<A, B>(auth: AuthAppState<A>, repo: B, config: RedemptionConfig) -> Router
where
    A: AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
    B: BeneficiaryRepository + Clone + Send + Sync + 'static,
{
    let state = RedemptionAppState::new(repo, config);

    Router::new()
        .route("/redeem", post(handlers::redeem::<B>))
        .route("/redeem/inspect", post(handlers::inspect::<B>))
        .route("/issue", post(handlers::issue::<B>))
        .route_layer(middleware::from_fn_with_state(auth, require_session::<A>))
        .with_state(state)
}
