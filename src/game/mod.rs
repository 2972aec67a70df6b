//! Game simulation modules

pub mod combat;
pub mod constants;
pub mod ingress;
pub mod physics;
pub mod registry;
pub mod room;
pub mod state;

pub use registry::{PlayerRegistry, PlayerSession, RoomRegistry};
pub use room::{RoomClosed, RoomHandle};
