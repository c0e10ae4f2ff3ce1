use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api;
use crate::metadata::MovieSearch;
use crate::service::ReviewService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReviewService>,
    pub search: Arc<dyn MovieSearch>,
}

impl AppState {
    pub fn new(service: Arc<ReviewService>, search: Arc<dyn MovieSearch>) -> Self {
        Self { service, search }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/register", post(api::handlers::register))
        .route("/api/login", post(api::handlers::login))
        .route("/api/logout", post(api::handlers::logout))
        .route("/api/profile", get(api::handlers::profile))
        .route(
            "/api/reviews",
            get(api::handlers::list_reviews).post(api::handlers::submit_review),
        )
        .route("/api/search", get(api::handlers::search))
        .route("/api/wishlist", get(api::handlers::list_wishlist))
        .route("/api/wishlist/add", post(api::handlers::add_to_wishlist))
        .route(
            "/api/wishlist/remove",
            post(api::handlers::remove_from_wishlist),
        )
        .route("/api/trivia", get(api::handlers::trivia))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::auth_middleware,
        ))
        .layer(middleware::from_fn(crate::middleware::log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
