pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use middleware::GuardConfig;
pub use state::AppState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};

use middleware::{access_guard, log_responses, set_request_context};

pub fn build_router(state: AppState, guard: GuardConfig) -> Router {
    Router::new()
        .route("/posts", get(handlers::list_posts))
        .route("/posts/{id}", get(handlers::get_post))
        .route("/admin/posts", post(handlers::create_post))
        .route(
            "/admin/posts/{id}",
            put(handlers::update_post).delete(handlers::delete_post),
        )
        .route("/auth/register", post(handlers::register))
        .route("/auth/sign-in", post(handlers::sign_in))
        .route("/auth/sign-out", post(handlers::sign_out))
        .route("/healthz", get(handlers::health))
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(guard, access_guard))
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
