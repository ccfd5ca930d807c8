//! Secret store access.
//!
//! Secrets are read once when a binary starts and kept in immutable state for
//! the life of the process. A failed read aborts start-up.

use std::future::Future;

use aws_sdk_ssm::error::DisplayErrorContext;

use crate::config::{AppConfig, SecretBackend};
use crate::error::AppError;

/// Read access to named secrets.
pub trait SecretStore {
    /// Fetch the value stored under `name`, decrypting it when `decrypt` is set.
    fn get(
        &self,
        name: &str,
        decrypt: bool,
    ) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// AWS Systems Manager Parameter Store.
#[derive(Clone)]
pub struct SsmSecretStore {
    client: aws_sdk_ssm::Client,
}

impl SsmSecretStore {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_ssm::Client::new(sdk_config),
        }
    }
}

impl SecretStore for SsmSecretStore {
    async fn get(&self, name: &str, decrypt: bool) -> Result<String, AppError> {
        let output = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(decrypt)
            .send()
            .await
            .map_err(|e| AppError::Secret(format!("{}: {}", name, DisplayErrorContext(&e))))?;

        output
            .parameter()
            .and_then(|p| p.value())
            .map(str::to_string)
            .ok_or_else(|| AppError::Secret(format!("{}: parameter has no value", name)))
    }
}

/// Secrets read from environment variables.
///
/// A secret name such as `/auth/username` maps to `AUTH_USERNAME`.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn var_name(name: &str) -> String {
        name.trim_start_matches('/')
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl SecretStore for EnvSecretStore {
    async fn get(&self, name: &str, _decrypt: bool) -> Result<String, AppError> {
        let var = Self::var_name(name);
        std::env::var(&var)
            .map_err(|_| AppError::Secret(format!("{}: environment variable {} not set", name, var)))
    }
}

/// Secret store selected by configuration.
#[derive(Clone)]
pub enum AnySecretStore {
    Ssm(SsmSecretStore),
    Env(EnvSecretStore),
}

impl AnySecretStore {
    /// Build the store named by `config.secret_backend`.
    pub async fn from_config(config: &AppConfig) -> Self {
        match config.secret_backend {
            SecretBackend::Ssm => {
                let sdk_config =
                    aws_config::defaults(aws_config::BehaviorVersion::latest()).load().await;
                tracing::info!("Using SSM Parameter Store for secrets");
                AnySecretStore::Ssm(SsmSecretStore::new(&sdk_config))
            }
            SecretBackend::Env => {
                tracing::info!("Using environment variables for secrets");
                AnySecretStore::Env(EnvSecretStore)
            }
        }
    }
}

impl SecretStore for AnySecretStore {
    async fn get(&self, name: &str, decrypt: bool) -> Result<String, AppError> {
        match self {
            AnySecretStore::Ssm(store) => store.get(name, decrypt).await,
            AnySecretStore::Env(store) => store.get(name, decrypt).await,
        }
    }
}

/// Fetch a decrypted secret, logging the failure before propagating it.
pub async fn fetch_secret<S: SecretStore + Sync>(store: &S, name: &str) -> Result<String, AppError> {
    store.get(name, true).await.inspect_err(|e| {
        tracing::error!(name, error = %e, "Error fetching secret");
    })
}
