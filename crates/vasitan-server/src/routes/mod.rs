mod auth;
mod categories;
pub mod forms;
mod listings;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::auth::middleware::{require_api_auth, require_auth};
use crate::auth::session::SessionKeys;
use crate::config::Config;
use crate::db::DbPool;

/// Pages owned by the rendering layer that actions redirect to.
pub mod paths {
    pub const HOME: &str = "/";
    pub const REGISTER: &str = "/register";
    pub const LOGIN: &str = "/login";
    pub const NEW_LISTING: &str = "/listings/new";
    pub const DASHBOARD: &str = "/dashboard/listings";

    pub fn listing(id: i64) -> String {
        format!("/listings/{id}")
    }

    pub fn edit_listing(id: i64) -> String {
        format!("{DASHBOARD}/{id}")
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub keys: SessionKeys,
}

async fn health() -> &'static str {
    "ok"
}

fn rate_limited(router: Router<AppState>, enabled: bool, per_second: u64, burst: u32) -> Router<AppState> {
    if !enabled {
        return router;
    }
    let governor = GovernorConfigBuilder::default()
        .per_second(per_second)
        .burst_size(burst)
        .finish()
        .expect("governor quota must be non-zero");
    router.layer(GovernorLayer::new(Arc::new(governor)))
}

pub fn create_router(state: AppState) -> Router {
    let limit = state.config.rate_limit;

    // Health checks — no rate limit
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/api/v1/health", get(health));

    // Auth actions — 10 requests burst per IP
    let auth_routes = Router::new()
        .route(paths::REGISTER, post(auth::register))
        .route(paths::LOGIN, post(auth::login))
        .route("/logout", post(auth::logout));
    let auth_routes = rate_limited(auth_routes, limit, 6, 10);

    // Listing actions — session required, large bodies for inline images
    let listing_actions = Router::new()
        .route(paths::NEW_LISTING, post(listings::create))
        .route("/dashboard/listings/{id}", post(listings::update))
        .route("/dashboard/listings/{id}/delete", post(listings::delete))
        .route("/dashboard/listings/{id}/status", post(listings::set_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(DefaultBodyLimit::max(state.config.max_form_bytes()));
    let listing_actions = rate_limited(listing_actions, limit, 2, 30);

    let private_api = Router::new()
        .route("/api/v1/me/listings", get(listings::mine))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_auth));

    let public_api = Router::new()
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/listings", get(listings::recent))
        .route("/api/v1/listings/{id}", get(listings::get))
        .route("/api/v1/listings/code/{code}", get(listings::by_code))
        .route("/api/v1/search", get(listings::search))
        .route("/api/v1/categories", get(categories::list))
        .route("/api/v1/categories/{slug}/listings", get(categories::listings));
    let api = rate_limited(public_api.merge(private_api), limit, 2, 120);

    Router::new()
        .merge(health_routes)
        .merge(auth_routes)
        .merge(listing_actions)
        .merge(api)
        .with_state(state)
}
