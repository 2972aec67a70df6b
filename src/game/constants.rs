//! Arena and timing constants shared by the room loop and the clients

use std::time::Duration;

/// Arena width in world units
pub const FIELD_WIDTH: f64 = 900.0;
/// Arena height in world units
pub const FIELD_HEIGHT: f64 = 600.0;
/// Side of the square a player occupies; `(x, y)` is its top-left corner
pub const PLAYER_SIZE: f64 = 20.0;

/// Spawn / respawn point
pub const SPAWN_X: f64 = FIELD_WIDTH / 2.0;
pub const SPAWN_Y: f64 = FIELD_HEIGHT / 2.0;

/// Hit points on spawn (bookkeeping only)
pub const PLAYER_HP: i32 = 100;

/// One 60 Hz frame, truncated to whole milliseconds
pub const PHYSICS_TICK: Duration = Duration::from_millis(1000 / 60);
/// Full `coords` correction broadcast
pub const FULL_BROADCAST_TICK: Duration = Duration::from_millis(300);

/// Minimum time between two accepted swings of the same player
pub const HIT_COOLDOWN: Duration = Duration::from_millis(1500);
/// Time a killed player stays dead
pub const RESPAWN_DELAY: Duration = Duration::from_millis(3000);

/// Hit-box is anchored this far up-and-left of the attacker's corner
pub const HIT_BOX_OFFSET: f64 = 20.0;
/// Hit-box side
pub const HIT_BOX_SIZE: f64 = 60.0;

/// Largest accepted velocity component, units per millisecond
pub const MAX_SPEED: f64 = 0.2;

/// Sub-action tag carried in `Text` on a `move` intent
pub const HIT_TAG: &str = "hit";

/// Room inbound command queue depth
pub const ROOM_INBOUND_CAPACITY: usize = 256;
/// Per-connection outbound frame queue depth
pub const OUTBOUND_CAPACITY: usize = 256;
