pub mod health;
pub mod invoke;

use axum::Router;

use crate::state::AppState;

/// Build the complete authorizer router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(invoke::router())
        .with_state(state)
}
