//! Basic-Auth credential parsing and the reference credentials they are
//! checked against.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use dealflow_common::config::SecretNames;
use dealflow_common::error::AppError;
use dealflow_common::secrets::{SecretStore, fetch_secret};

/// Scheme prefix expected on the authorization token.
pub const BASIC_PREFIX: &str = "Basic ";

/// Username/password pair presented by a caller.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Why a token could not be turned into credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Token absent, empty, or not using the Basic scheme.
    MissingOrInvalidScheme,
    /// Payload is not valid base64 or not UTF-8.
    Decode,
    /// Decoded payload has no `:` separator.
    Malformed,
}

impl BasicCredentials {
    /// Parse a `Basic <base64(username:password)>` token.
    ///
    /// The payload is split on the first `:` only, so passwords may contain
    /// colons.
    pub fn parse(token: Option<&str>) -> Result<Self, TokenError> {
        let encoded = token
            .and_then(|t| t.strip_prefix(BASIC_PREFIX))
            .ok_or(TokenError::MissingOrInvalidScheme)?;

        let bytes = STANDARD.decode(encoded).map_err(|_| TokenError::Decode)?;
        let decoded = String::from_utf8(bytes).map_err(|_| TokenError::Decode)?;

        let (username, password) = decoded.split_once(':').ok_or(TokenError::Malformed)?;

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Credentials every request is compared against. Loaded once at start-up.
#[derive(Clone)]
pub struct ReferenceCredentials {
    username: String,
    password: String,
}

impl std::fmt::Debug for ReferenceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceCredentials")
            .field("username", &"***")
            .field("password", &"***")
            .finish()
    }
}

impl ReferenceCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Fetch username and password from the secret store.
    pub async fn load<S: SecretStore + Sync>(
        store: &S,
        names: &SecretNames,
    ) -> Result<Self, AppError> {
        let username = fetch_secret(store, &names.auth_username).await?;
        let password = fetch_secret(store, &names.auth_password).await?;
        Ok(Self { username, password })
    }

    /// Exact equality on both fields.
    pub fn matches(&self, presented: &BasicCredentials) -> bool {
        presented.username == self.username && presented.password == self.password
    }
}
