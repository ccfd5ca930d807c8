pub mod health;
pub mod invoke;
pub mod webhook;

use axum::Router;

use dealflow_common::queue::QueuePublisher;

use crate::state::AppState;

/// Build the complete receiver router.
pub fn create_router<Q>(state: AppState<Q>) -> Router
where
    Q: QueuePublisher + Clone + Send + Sync + 'static,
{
    Router::new()
        .merge(health::router::<Q>())
        .merge(invoke::router::<Q>())
        .merge(webhook::router::<Q>())
        .with_state(state)
}
