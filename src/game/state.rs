//! Authoritative room state (owned by the room task)
//!
//! Every method here runs on the room's single task, so player fields are
//! mutated without locking. Broadcasts are queued on each member's outbound
//! channel and never wait.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::ws::protocol::{InboundMsg, InboundStatus, OutboundMsg, PlayerSnapshot};

use super::combat::{CombatSystem, Rect};
use super::constants::{HIT_TAG, PLAYER_HP, SPAWN_X, SPAWN_Y};
use super::physics::PhysicsSystem;
use super::registry::{PlayerId, PlayerSession};

/// Player state in a room (authoritative)
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,

    // Position and movement
    pub x: f64,
    pub y: f64,
    pub x_s: f64,
    pub y_s: f64,
    /// Velocity changed since the last `move` broadcast
    pub speed_updated: bool,

    // Combat
    pub hp: i32,
    pub last_hit: Option<Instant>,
    pub alive: bool,
}

impl PlayerState {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            name: String::new(),
            x: SPAWN_X,
            y: SPAWN_Y,
            x_s: 0.0,
            y_s: 0.0,
            speed_updated: false,
            hp: PLAYER_HP,
            last_hit: None,
            alive: true,
        }
    }

    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id.to_string(),
            name: self.name.clone(),
            x: self.x,
            y: self.y,
            x_s: self.x_s,
            y_s: self.y_s,
        }
    }
}

/// A joined player: simulation state plus the connection it reports to
struct Member {
    state: PlayerState,
    session: Arc<PlayerSession>,
}

/// Result of handling one inbound intent
#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    /// Player attached (or renamed) and `room_data` broadcast
    Joined,
    /// Velocity applied; `hit` is set when the intent carried a swing
    Moved { hit: Option<HitOutcome> },
    /// Sender is attached to a different room
    StaleRoom,
    /// Sender never joined this room
    UnknownPlayer,
    /// Sender was killed after the intent was queued
    Dead,
}

/// Result of a swing
#[derive(Debug, Clone, PartialEq)]
pub enum HitOutcome {
    /// Swung too soon after the previous accepted swing; ignored
    CoolingDown,
    /// Attacker is dead; ignored
    Dead,
    /// Swing accepted; `victims` were killed and need a respawn timer
    Swung { victims: Vec<PlayerId> },
}

/// Room state (owned by room task)
pub struct RoomState {
    pub id: String,
    members: HashMap<PlayerId, Member>,
}

impl RoomState {
    pub fn new(id: String) -> Self {
        Self {
            id,
            members: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.members.contains_key(id)
    }

    pub fn player(&self, id: &PlayerId) -> Option<&PlayerState> {
        self.members.get(id).map(|m| &m.state)
    }

    /// Queue a frame for every member
    pub fn broadcast(&self, msg: &OutboundMsg) {
        for member in self.members.values() {
            member.session.send(msg.clone());
        }
    }

    /// Handle one intent from `player`
    pub fn apply_intent(
        &mut self,
        msg: &InboundMsg,
        player: &Arc<PlayerSession>,
        now: Instant,
    ) -> IntentOutcome {
        if player.room() != Some(self.id.as_str()) {
            debug!(
                room_id = %self.id,
                player_id = %player.id,
                attached = ?player.room(),
                "Intent for another room, skipped"
            );
            return IntentOutcome::StaleRoom;
        }

        match msg.status {
            InboundStatus::Connected => {
                self.handle_join(msg, player);
                IntentOutcome::Joined
            }
            InboundStatus::Move => {
                let Some(member) = self.members.get_mut(&player.id) else {
                    debug!(room_id = %self.id, player_id = %player.id, "Move from unknown player, skipped");
                    return IntentOutcome::UnknownPlayer;
                };
                if !member.state.alive {
                    debug!(room_id = %self.id, player_id = %player.id, "Move from dead player, skipped");
                    return IntentOutcome::Dead;
                }
                let (x_s, y_s) = msg.velocity();
                member.state.x_s = x_s;
                member.state.y_s = y_s;
                member.state.speed_updated = true;

                let hit = msg
                    .is_tagged(HIT_TAG)
                    .then(|| self.handle_hit(player.id, now));
                IntentOutcome::Moved { hit }
            }
        }
    }

    fn handle_join(&mut self, msg: &InboundMsg, player: &Arc<PlayerSession>) {
        let member = self.members.entry(player.id).or_insert_with(|| {
            player.set_alive(true);
            Member {
                state: PlayerState::new(player.id),
                session: player.clone(),
            }
        });
        if let Some(name) = &msg.name {
            member.state.name = name.clone();
        }
        let name = member.state.name.clone();

        info!(
            room_id = %self.id,
            player_id = %player.id,
            name = %name,
            player_count = self.members.len(),
            "Player joined room"
        );

        let players = self
            .members
            .values()
            .filter(|m| m.state.alive)
            .map(|m| m.state.snapshot())
            .collect();
        self.broadcast(&OutboundMsg::room_data(players));
    }

    /// Resolve a swing by `attacker_id`
    pub fn handle_hit(&mut self, attacker_id: PlayerId, now: Instant) -> HitOutcome {
        let Some(attacker) = self.members.get_mut(&attacker_id) else {
            return HitOutcome::CoolingDown;
        };
        if !attacker.state.alive {
            return HitOutcome::Dead;
        }
        if !CombatSystem::can_swing(attacker.state.last_hit, now) {
            debug!(room_id = %self.id, player_id = %attacker_id, "Swing during cooldown, ignored");
            return HitOutcome::CoolingDown;
        }
        attacker.state.last_hit = Some(now);
        let hit_box = CombatSystem::hit_box(attacker.state.x, attacker.state.y);
        let attacker_tag = attacker_id.to_string();

        self.broadcast(&OutboundMsg::swing(&attacker_tag, HIT_TAG));

        let victims: Vec<PlayerId> = self
            .members
            .values()
            .filter(|m| m.state.alive && m.state.id != attacker_id)
            .filter(|m| Rect::player(m.state.x, m.state.y).overlaps(&hit_box))
            .map(|m| m.state.id)
            .collect();

        for victim_id in &victims {
            if let Some(victim) = self.members.get_mut(victim_id) {
                victim.state.alive = false;
                victim.state.hp = 0;
                victim.session.set_alive(false);
            }
            info!(room_id = %self.id, attacker = %attacker_id, victim = %victim_id, "Player killed");
            self.broadcast(&OutboundMsg::killed(&attacker_tag, &victim_id.to_string()));
        }

        HitOutcome::Swung { victims }
    }

    /// Physics tick: move every alive player by `dt_ms` and announce velocity changes
    pub fn step(&mut self, dt_ms: f64) {
        let mut changed = Vec::new();

        for member in self.members.values_mut() {
            let player = &mut member.state;
            if !player.alive {
                continue;
            }

            let (x, y) = PhysicsSystem::integrate(player.x, player.y, player.x_s, player.y_s, dt_ms);
            player.x = x;
            player.y = y;

            if player.speed_updated {
                player.speed_updated = false;
                changed.push(OutboundMsg::velocity(
                    &player.id.to_string(),
                    player.x_s,
                    player.y_s,
                ));
            }
        }

        for msg in &changed {
            self.broadcast(msg);
        }
    }

    /// Position correction for every member, dead ones included
    pub fn full_broadcast(&self) {
        for member in self.members.values() {
            let p = &member.state;
            self.broadcast(&OutboundMsg::coords(&p.id.to_string(), &p.name, p.x, p.y));
        }
    }

    /// Bring a killed player back at the spawn point. No-op for a player who left.
    pub fn respawn(&mut self, id: &PlayerId) -> bool {
        let Some(member) = self.members.get_mut(id) else {
            debug!(room_id = %self.id, player_id = %id, "Respawn for departed player, skipped");
            return false;
        };
        member.state.alive = true;
        member.state.hp = PLAYER_HP;
        member.state.x = SPAWN_X;
        member.state.y = SPAWN_Y;
        member.session.set_alive(true);

        self.broadcast(&OutboundMsg::alive(&id.to_string(), SPAWN_X, SPAWN_Y));
        true
    }

    /// Remove a player and tell the remaining members
    pub fn leave(&mut self, id: &PlayerId) -> bool {
        if self.members.remove(id).is_none() {
            return false;
        }
        info!(
            room_id = %self.id,
            player_id = %id,
            player_count = self.members.len(),
            "Player left room"
        );
        self.broadcast(&OutboundMsg::player_left(&id.to_string()));
        true
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    #[cfg(test)]
    fn place(&mut self, id: &PlayerId, x: f64, y: f64) {
        if let Some(member) = self.members.get_mut(id) {
            member.state.x = x;
            member.state.y = y;
        }
    }
}
