pub mod credentials;
pub mod handler;
pub mod policy;
pub mod routes;
pub mod state;
