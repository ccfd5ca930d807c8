//! Shared application state for the receiver server.

use std::sync::Arc;

use dealflow_authorizer::credentials::ReferenceCredentials;
use dealflow_common::queue::AnyQueue;

/// Application state shared across all route handlers via Axum `State`.
///
/// Generic over the publisher so tests can swap in an in-memory queue.
#[derive(Clone)]
pub struct AppState<Q = AnyQueue> {
    pub queue: Q,
    /// Destination queue, read from the secret store at start-up
    pub queue_url: Arc<str>,
    /// Checked on direct `/webhook` calls
    pub credentials: Arc<ReferenceCredentials>,
}

impl<Q> AppState<Q> {
    pub fn new(
        queue: Q,
        queue_url: impl Into<Arc<str>>,
        credentials: ReferenceCredentials,
    ) -> Self {
        Self {
            queue,
            queue_url: queue_url.into(),
            credentials: Arc::new(credentials),
        }
    }
}
