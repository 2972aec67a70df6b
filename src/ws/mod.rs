//! WebSocket transport boundary

pub mod handler;
pub mod protocol;
