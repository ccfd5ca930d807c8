pub mod config;
pub mod error;
pub mod queue;
pub mod redact;
pub mod secrets;
pub mod telemetry;
pub mod types;
