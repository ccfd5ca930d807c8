pub mod health;
pub mod invoke;

use axum::Router;

use crate::slack::ChatPoster;
use crate::state::AppState;

/// Build the complete notifier router.
pub fn create_router<P>(state: AppState<P>) -> Router
where
    P: ChatPoster + Clone + Send + Sync + 'static,
{
    Router::new()
        .merge(health::router::<P>())
        .merge(invoke::router::<P>())
        .with_state(state)
}
