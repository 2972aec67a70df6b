//! HTTP surface: pages, status endpoints, websocket upgrade

pub mod routes;

pub use routes::build_router;
