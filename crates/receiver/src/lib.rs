pub mod handler;
pub mod middleware;
pub mod routes;
pub mod state;
