//! Process-scoped application context

pub mod state;

pub use state::AppState;
