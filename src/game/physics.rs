//! Player movement integration and arena boundary reflection

use super::constants::{FIELD_HEIGHT, FIELD_WIDTH, PLAYER_SIZE};

/// Physics system for advancing player squares across the arena
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Advance a position by `velocity * dt_ms` and reflect it back into the arena.
    /// Returns (new_x, new_y)
    pub fn integrate(x: f64, y: f64, x_s: f64, y_s: f64, dt_ms: f64) -> (f64, f64) {
        let candidate_x = x + x_s * dt_ms;
        let candidate_y = y + y_s * dt_ms;

        (
            Self::reflect_axis(candidate_x, FIELD_WIDTH),
            Self::reflect_axis(candidate_y, FIELD_HEIGHT),
        )
    }

    /// Bring one coordinate of the square's top-left corner back inside `[0, extent]`.
    ///
    /// Single step, not iterated: a negative candidate is mirrored about zero, so
    /// an overshoot larger than the extent still lands outside the arena.
    pub fn reflect_axis(candidate: f64, extent: f64) -> f64 {
        if candidate < 0.0 {
            -candidate
        } else if candidate + PLAYER_SIZE > extent {
            candidate - PLAYER_SIZE - (candidate - extent)
        } else {
            candidate
        }
    }

    /// Whether a square corner lies inside the playable area on both axes
    #[cfg(test)]
    pub fn in_bounds(x: f64, y: f64) -> bool {
        (0.0..=FIELD_WIDTH - PLAYER_SIZE).contains(&x)
            && (0.0..=FIELD_HEIGHT - PLAYER_SIZE).contains(&y)
    }
}
