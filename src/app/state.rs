//! Application state shared across routes

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::game::{PlayerRegistry, RoomHandle, RoomRegistry};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub players: Arc<PlayerRegistry>,
    pub rooms: Arc<RoomRegistry>,
}

impl AppState {
    /// Build the state and start every configured room
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        let players = Arc::new(PlayerRegistry::new());
        let rooms = Arc::new(RoomRegistry::new());

        for room_id in &config.rooms {
            rooms.insert(RoomHandle::spawn(room_id.clone()));
            info!(room_id = %room_id, "Room registered");
        }

        Self {
            config,
            players,
            rooms,
        }
    }

    /// Terminate and unregister every room
    pub fn shutdown(&self) {
        for room in self.rooms.all() {
            self.rooms.remove(room.id());
            room.terminate();
        }
    }
}
