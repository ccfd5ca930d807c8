use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

/// Where reference secrets are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretBackend {
    /// AWS Systems Manager Parameter Store.
    Ssm,
    /// Process environment (local development).
    Env,
}

/// Which transport carries events from the receiver to the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueBackend {
    Sqs,
    Redis,
}

/// Names under which each secret is stored.
#[derive(Debug, Clone, Deserialize)]
pub struct SecretNames {
    pub auth_username: String,
    pub auth_password: String,
    pub queue_url: String,
    pub slack_bot_token: String,
    pub slack_channel_id: String,
}

impl Default for SecretNames {
    fn default() -> Self {
        Self {
            auth_username: "/auth/username".to_string(),
            auth_password: "/auth/password".to_string(),
            queue_url: "/sqs/queue_url_2".to_string(),
            slack_bot_token: "/slack/bot_token".to_string(),
            slack_channel_id: "/slack/channel_id".to_string(),
        }
    }
}

/// Global application configuration loaded from environment variables.
///
/// Every binary loads the same structure and uses the parts it needs.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP listener binds to (default: 0.0.0.0:3000)
    pub bind_addr: SocketAddr,

    /// Secret store backend (default: ssm)
    pub secret_backend: SecretBackend,

    /// Secret names for credentials, queue URL and chat settings
    pub secret_names: SecretNames,

    /// Queue backend (default: sqs)
    pub queue_backend: QueueBackend,

    /// Redis connection string, used when `queue_backend` is redis
    pub redis_url: String,

    /// Chat API endpoint for posting messages
    pub slack_api_url: String,

    /// Upper bound on a single chat post, in seconds (default: 10)
    pub slack_timeout_secs: u64,

    /// Maximum number of messages the Redis consumer reserves per batch (default: 10)
    pub notifier_batch_size: usize,

    /// Names this consumer's in-flight list; keep it stable across restarts (default: notifier)
    pub notifier_consumer_name: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = SecretNames::default();

        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("BIND_ADDR must be a valid socket address"))?,
            secret_backend: parse_secret_backend(
                &std::env::var("SECRET_BACKEND").unwrap_or_else(|_| "ssm".to_string()),
            )?,
            secret_names: SecretNames {
                auth_username: std::env::var("AUTH_USERNAME_PARAM")
                    .unwrap_or(defaults.auth_username),
                auth_password: std::env::var("AUTH_PASSWORD_PARAM")
                    .unwrap_or(defaults.auth_password),
                queue_url: std::env::var("QUEUE_URL_PARAM").unwrap_or(defaults.queue_url),
                slack_bot_token: std::env::var("SLACK_BOT_TOKEN_PARAM")
                    .unwrap_or(defaults.slack_bot_token),
                slack_channel_id: std::env::var("SLACK_CHANNEL_ID_PARAM")
                    .unwrap_or(defaults.slack_channel_id),
            },
            queue_backend: parse_queue_backend(
                &std::env::var("QUEUE_BACKEND").unwrap_or_else(|_| "sqs".to_string()),
            )?,
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            slack_api_url: std::env::var("SLACK_API_URL")
                .unwrap_or_else(|_| "https://slack.com/api/chat.postMessage".to_string()),
            slack_timeout_secs: std::env::var("SLACK_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SLACK_TIMEOUT_SECS must be a valid u64"))?,
            notifier_batch_size: std::env::var("NOTIFIER_BATCH_SIZE")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| anyhow::anyhow!("NOTIFIER_BATCH_SIZE must be a positive integer"))?,
            notifier_consumer_name: std::env::var("NOTIFIER_CONSUMER_NAME")
                .unwrap_or_else(|_| "notifier".to_string()),
        })
    }

    pub fn slack_timeout(&self) -> Duration {
        Duration::from_secs(self.slack_timeout_secs)
    }
}

fn parse_secret_backend(value: &str) -> anyhow::Result<SecretBackend> {
    match value.to_ascii_lowercase().as_str() {
        "ssm" => Ok(SecretBackend::Ssm),
        "env" => Ok(SecretBackend::Env),
        other => Err(anyhow::anyhow!(
            "SECRET_BACKEND must be 'ssm' or 'env', got '{}'",
            other
        )),
    }
}

fn parse_queue_backend(value: &str) -> anyhow::Result<QueueBackend> {
    match value.to_ascii_lowercase().as_str() {
        "sqs" => Ok(QueueBackend::Sqs),
        "redis" => Ok(QueueBackend::Redis),
        other => Err(anyhow::anyhow!(
            "QUEUE_BACKEND must be 'sqs' or 'redis', got '{}'",
            other
        )),
    }
}
