//! Process-wide registries of connected players and running rooms

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::ws::protocol::OutboundMsg;

use super::room::RoomHandle;

/// Player identity, assigned when the connection is accepted
pub type PlayerId = Uuid;

/// One connected client: identity, outbound queue, room attachment
#[derive(Debug)]
pub struct PlayerSession {
    pub id: PlayerId,
    outbound: mpsc::Sender<OutboundMsg>,
    room: OnceLock<String>,
    /// Mirror of the room-owned alive flag, read by the ingress filter
    alive: AtomicBool,
}

impl PlayerSession {
    pub fn new(id: PlayerId, outbound: mpsc::Sender<OutboundMsg>) -> Self {
        Self {
            id,
            outbound,
            room: OnceLock::new(),
            alive: AtomicBool::new(true),
        }
    }

    /// Attach to a room. The attachment is write-once; returns false if the
    /// session already belongs to a different room.
    pub fn attach(&self, room_id: &str) -> bool {
        self.room.get_or_init(|| room_id.to_string()) == room_id
    }

    pub fn room(&self) -> Option<&str> {
        self.room.get().map(String::as_str)
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Relaxed);
    }

    /// Queue a frame for this client without waiting. A full queue drops the frame.
    pub fn send(&self, msg: OutboundMsg) {
        match self.outbound.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(msg)) => {
                warn!(
                    player_id = %self.id,
                    status = ?msg.status,
                    "Outbound queue full, dropping frame"
                );
            }
            Err(TrySendError::Closed(_)) => {
                debug!(player_id = %self.id, "Outbound queue closed");
            }
        }
    }
}

/// Registry of all connected players, in or out of a room
pub struct PlayerRegistry {
    players: Mutex<HashMap<PlayerId, Arc<PlayerSession>>>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self {
            players: Mutex::new(HashMap::new()),
        }
    }

    /// Create a detached session under a fresh id
    pub fn register(&self, outbound: mpsc::Sender<OutboundMsg>) -> Arc<PlayerSession> {
        let session = Arc::new(PlayerSession::new(Uuid::new_v4(), outbound));
        self.insert(session.clone());
        session
    }

    pub fn insert(&self, session: Arc<PlayerSession>) {
        self.players.lock().insert(session.id, session);
    }

    pub fn get(&self, id: &PlayerId) -> Option<Arc<PlayerSession>> {
        self.players.lock().get(id).cloned()
    }

    pub fn remove(&self, id: &PlayerId) -> Option<Arc<PlayerSession>> {
        self.players.lock().remove(id)
    }

    pub fn len(&self) -> usize {
        self.players.lock().len()
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of all running rooms
pub struct RoomRegistry {
    rooms: Mutex<HashMap<String, RoomHandle>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, id: &str) -> Option<RoomHandle> {
        self.rooms.lock().get(id).cloned()
    }

    pub fn insert(&self, handle: RoomHandle) {
        self.rooms.lock().insert(handle.id().to_string(), handle);
    }

    pub fn remove(&self, id: &str) -> Option<RoomHandle> {
        self.rooms.lock().remove(id)
    }

    /// Snapshot of every registered room
    pub fn all(&self) -> Vec<RoomHandle> {
        let mut rooms: Vec<RoomHandle> = self.rooms.lock().values().cloned().collect();
        rooms.sort_by(|a, b| a.id().cmp(b.id()));
        rooms
    }

    pub fn active_rooms(&self) -> usize {
        self.rooms.lock().len()
    }

    pub fn total_players(&self) -> usize {
        self.rooms
            .lock()
            .values()
            .map(|room| room.player_count())
            .sum()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_registry_add_get_remove() {
        let registry = PlayerRegistry::new();
        let (tx, _rx) = mpsc::channel(4);
        let session = registry.register(tx);

        assert_eq!(registry.len(), 1);
        assert!(registry.get(&session.id).is_some());
        assert!(registry.remove(&session.id).is_some());
        assert!(registry.get(&session.id).is_none());
        assert!(registry.remove(&session.id).is_none());
    }

    #[test]
    fn session_room_is_write_once() {
        let (tx, _rx) = mpsc::channel(4);
        let session = PlayerSession::new(Uuid::new_v4(), tx);

        assert_eq!(session.room(), None);
        assert!(session.attach("main"));
        assert!(session.attach("main"));
        assert!(!session.attach("other"));
        assert_eq!(session.room(), Some("main"));
    }

    #[test]
    fn full_outbound_queue_drops_frame() {
        let (tx, mut rx) = mpsc::channel(1);
        let session = PlayerSession::new(Uuid::new_v4(), tx);

        session.send(OutboundMsg::player_left("a"));
        session.send(OutboundMsg::player_left("b"));

        assert_eq!(rx.try_recv().unwrap(), OutboundMsg::player_left("a"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn room_registry_lookup() {
        let registry = RoomRegistry::new();
        assert!(registry.get("main").is_none());

        registry.insert(RoomHandle::spawn("main".to_string()));
        registry.insert(RoomHandle::spawn("side".to_string()));

        assert_eq!(registry.active_rooms(), 2);
        assert_eq!(registry.get("main").map(|r| r.id().to_string()), Some("main".into()));
        assert_eq!(
            registry.all().iter().map(|r| r.id()).collect::<Vec<_>>(),
            vec!["main", "side"]
        );
        assert_eq!(registry.total_players(), 0);

        let removed = registry.remove("main");
        assert!(removed.is_some());
        assert!(registry.get("main").is_none());
        if let Some(room) = removed {
            room.terminate();
        }
        if let Some(room) = registry.remove("side") {
            room.terminate();
        }
    }
}
