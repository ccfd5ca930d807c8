//! Shared application state for the notifier server.

use crate::slack::SlackClient;

/// Application state shared across all route handlers via Axum `State`.
///
/// Generic over the chat client so tests can record posts instead.
#[derive(Clone)]
pub struct AppState<P = SlackClient> {
    pub poster: P,
}

impl<P> AppState<P> {
    pub fn new(poster: P) -> Self {
        Self { poster }
    }
}
