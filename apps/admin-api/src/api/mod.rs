//! API routes, nested under /api by axum_helpers::create_router

pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

pub fn routes(state: &AppState) -> Router {
    let service = users::service(state);

    Router::new()
        .nest("/users", domain_users::handlers::router(service.clone()))
        .nest("/auth", domain_users::auth_handlers::router(service))
        .merge(health::router(state.clone()))
}
