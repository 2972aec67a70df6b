//! Room actor - the single task that serializes every mutation of a room

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::util::time::elapsed_millis;
use crate::ws::protocol::InboundMsg;

use super::constants::{FULL_BROADCAST_TICK, PHYSICS_TICK, RESPAWN_DELAY, ROOM_INBOUND_CAPACITY};
use super::registry::{PlayerId, PlayerSession};
use super::state::{HitOutcome, IntentOutcome, RoomState};

/// Commands accepted on a room's inbound queue
#[derive(Debug)]
pub enum RoomCommand {
    /// Client intent, already passed through the ingress filter
    Intent {
        msg: InboundMsg,
        player: Arc<PlayerSession>,
    },
    /// Connection closed
    Leave { player_id: PlayerId },
}

/// The room task has exited
#[derive(Debug, thiserror::Error)]
#[error("room {0} is no longer running")]
pub struct RoomClosed(pub String);

/// Handle to a running room
#[derive(Clone)]
pub struct RoomHandle {
    id: Arc<str>,
    inbound_tx: mpsc::Sender<RoomCommand>,
    terminate_tx: Arc<watch::Sender<bool>>,
    player_count: Arc<AtomicUsize>,
}

impl RoomHandle {
    /// Start a room task and return its handle
    pub fn spawn(id: String) -> Self {
        let (room, handle) = Room::new(id);
        tokio::spawn(room.run());
        handle
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }

    /// Queue an intent, waiting for queue space
    pub async fn submit(
        &self,
        msg: InboundMsg,
        player: Arc<PlayerSession>,
    ) -> Result<(), RoomClosed> {
        self.send(RoomCommand::Intent { msg, player }).await
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<(), RoomClosed> {
        self.send(RoomCommand::Leave { player_id }).await
    }

    /// Stop the room for good. Pending respawns are dropped.
    pub fn terminate(&self) {
        let _ = self.terminate_tx.send(true);
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomClosed> {
        self.inbound_tx
            .send(cmd)
            .await
            .map_err(|_| RoomClosed(self.id.to_string()))
    }
}

/// The authoritative room loop
pub struct Room {
    state: RoomState,
    inbound_rx: mpsc::Receiver<RoomCommand>,
    respawn_tx: mpsc::UnboundedSender<PlayerId>,
    respawn_rx: mpsc::UnboundedReceiver<PlayerId>,
    terminate_rx: watch::Receiver<bool>,
    /// Pending respawn timers, one per dead player
    respawn_timers: HashMap<PlayerId, JoinHandle<()>>,
    player_count: Arc<AtomicUsize>,
}

impl Room {
    /// Create a room and its handle without starting it
    pub fn new(id: String) -> (Self, RoomHandle) {
        let (inbound_tx, inbound_rx) = mpsc::channel(ROOM_INBOUND_CAPACITY);
        let (respawn_tx, respawn_rx) = mpsc::unbounded_channel();
        let (terminate_tx, terminate_rx) = watch::channel(false);
        let player_count = Arc::new(AtomicUsize::new(0));

        let handle = RoomHandle {
            id: Arc::from(id.as_str()),
            inbound_tx,
            terminate_tx: Arc::new(terminate_tx),
            player_count: player_count.clone(),
        };

        let room = Self {
            state: RoomState::new(id),
            inbound_rx,
            respawn_tx,
            respawn_rx,
            terminate_rx,
            respawn_timers: HashMap::new(),
            player_count,
        };

        (room, handle)
    }

    /// Run until terminated
    pub async fn run(mut self) {
        info!(room_id = %self.state.id, "Room started");

        let mut physics_ticker = interval(PHYSICS_TICK);
        physics_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut broadcast_ticker = interval(FULL_BROADCAST_TICK);
        broadcast_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut prev_tick = Instant::now();

        loop {
            tokio::select! {
                cmd = self.inbound_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                Some(player_id) = self.respawn_rx.recv() => {
                    self.respawn_timers.remove(&player_id);
                    self.state.respawn(&player_id);
                }
                _ = physics_ticker.tick() => {
                    let now = Instant::now();
                    self.state.step(elapsed_millis(prev_tick.into_std(), now.into_std()));
                    prev_tick = now;
                }
                _ = broadcast_ticker.tick() => {
                    self.state.full_broadcast();
                }
                _ = self.terminate_rx.changed() => break,
            }
        }

        self.shutdown();
    }

    fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Intent { msg, player } => {
                let outcome = self.state.apply_intent(&msg, &player, Instant::now().into_std());
                match outcome {
                    IntentOutcome::Joined => self.sync_player_count(),
                    IntentOutcome::Moved {
                        hit: Some(HitOutcome::Swung { victims }),
                    } => {
                        for victim in victims {
                            self.schedule_respawn(victim);
                        }
                    }
                    IntentOutcome::Moved { .. } => {}
                    dropped @ (IntentOutcome::StaleRoom
                    | IntentOutcome::UnknownPlayer
                    | IntentOutcome::Dead) => {
                        debug!(room_id = %self.state.id, player_id = %player.id, outcome = ?dropped, "Intent dropped");
                    }
                }
            }
            RoomCommand::Leave { player_id } => {
                if let Some(timer) = self.respawn_timers.remove(&player_id) {
                    timer.abort();
                }
                self.state.leave(&player_id);
                self.sync_player_count();
            }
        }
    }

    /// Deliver a respawn for `player_id` after the respawn delay. The timer
    /// never blocks: if the room is gone the event is dropped.
    fn schedule_respawn(&mut self, player_id: PlayerId) {
        let respawn_tx = self.respawn_tx.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(RESPAWN_DELAY).await;
            let _ = respawn_tx.send(player_id);
        });
        if let Some(previous) = self.respawn_timers.insert(player_id, timer) {
            previous.abort();
        }
    }

    fn sync_player_count(&self) {
        self.player_count.store(self.state.len(), Ordering::Relaxed);
    }

    fn shutdown(&mut self) {
        for (_, timer) in self.respawn_timers.drain() {
            timer.abort();
        }
        if !self.state.is_empty() {
            debug!(room_id = %self.state.id, players = self.state.len(), "Dropping remaining players");
        }
        self.state.clear();
        self.sync_player_count();
        info!(room_id = %self.state.id, "Room terminated");
    }
}
