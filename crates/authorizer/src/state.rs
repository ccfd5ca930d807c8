//! Shared application state for the authorizer server.

use std::sync::Arc;

use crate::credentials::ReferenceCredentials;

/// Application state shared across all route handlers via Axum `State`.
///
/// Reference credentials are fetched once at start-up and never change.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<ReferenceCredentials>,
}

impl AppState {
    pub fn new(credentials: ReferenceCredentials) -> Self {
        Self {
            credentials: Arc::new(credentials),
        }
    }
}
