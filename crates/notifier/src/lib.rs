pub mod consumer;
pub mod handler;
pub mod message;
pub mod routes;
pub mod slack;
pub mod state;
