//! Basic-Auth gate for direct HTTP ingress.
//!
//! Behind a gateway the authorizer runs before the receiver is invoked. A
//! direct call to `/webhook` has no such gate, so the same credential check
//! runs here as an Axum extractor.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use dealflow_authorizer::credentials::{BasicCredentials, TokenError};
use dealflow_common::types::ApiResponse;

use crate::state::AppState;

pub const MSG_UNAUTHORIZED: &str = "Unauthorized";
pub const MSG_FORBIDDEN: &str = "Forbidden";

/// Caller whose Basic credentials matched the reference credentials.
///
/// Use as an Axum extractor on routes that are not behind the authorizer:
/// ```ignore
/// async fn handler(_auth: BasicAuth) -> impl IntoResponse { .. }
/// ```
#[derive(Debug, Clone)]
pub struct BasicAuth;

/// Why a request was turned away before reaching the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No usable Basic token: 401 with a challenge.
    Missing(TokenError),
    /// Well-formed token with the wrong username or password: 403.
    Mismatch,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Missing(_) => {
                let mut response = ApiResponse::new(401, MSG_UNAUTHORIZED).into_http_response();
                response.headers_mut().insert(
                    WWW_AUTHENTICATE,
                    axum::http::HeaderValue::from_static("Basic realm=\"dealflow\""),
                );
                response
            }
            AuthRejection::Mismatch => ApiResponse::new(403, MSG_FORBIDDEN).into_http_response(),
        }
    }
}

impl<Q: Send + Sync> FromRequestParts<AppState<Q>> for BasicAuth {
    type Rejection = AuthRejection;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<Q>,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let credentials = state.credentials.clone();

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        async move {
            let presented = BasicCredentials::parse(auth_header.as_deref()).map_err(|e| {
                tracing::warn!(reason = ?e, "Rejected webhook: unusable authorization header");
                AuthRejection::Missing(e)
            })?;

            if !credentials.matches(&presented) {
                tracing::warn!("Rejected webhook: invalid credentials");
                return Err(AuthRejection::Mismatch);
            }

            Ok(BasicAuth)
        }
    }
}
