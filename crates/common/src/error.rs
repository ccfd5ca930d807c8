use thiserror::Error;

/// Common error types used across the pipeline.
///
/// None of these are ever shown to an external caller: handlers log them and
/// answer with a generic message instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Secret store error: {0}")]
    Secret(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Chat API error: {0}")]
    Chat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
