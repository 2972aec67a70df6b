//! Combat system - melee hit-box, overlap test, swing cooldown

use std::time::Instant;

use super::constants::{HIT_BOX_OFFSET, HIT_BOX_SIZE, HIT_COOLDOWN, PLAYER_SIZE};

/// Axis-aligned rectangle, `(x, y)` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// The square occupied by a player
    pub fn player(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            w: PLAYER_SIZE,
            h: PLAYER_SIZE,
        }
    }

    /// Check overlap: on each axis either edge of `self` must fall inside
    /// `other`'s span, edges inclusive.
    pub fn overlaps(&self, other: &Rect) -> bool {
        span_touches(self.x, self.x + self.w, other.x, other.x + other.w)
            && span_touches(self.y, self.y + self.h, other.y, other.y + other.h)
    }
}

fn span_touches(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> bool {
    let inside = |v: f64| v >= b_start && v <= b_end;
    inside(a_start) || inside(a_end)
}

/// Combat system for melee swings
pub struct CombatSystem;

impl CombatSystem {
    /// Check if a player can swing (cooldown check)
    pub fn can_swing(last_hit: Option<Instant>, now: Instant) -> bool {
        match last_hit {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= HIT_COOLDOWN,
        }
    }

    /// Hit-box of a swing by the player whose square starts at `(x, y)`
    pub fn hit_box(x: f64, y: f64) -> Rect {
        Rect {
            x: x - HIT_BOX_OFFSET,
            y: y - HIT_BOX_OFFSET,
            w: HIT_BOX_SIZE,
            h: HIT_BOX_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn hit_box_surrounds_attacker() {
        let hit_box = CombatSystem::hit_box(100.0, 100.0);
        assert_eq!(
            hit_box,
            Rect {
                x: 80.0,
                y: 80.0,
                w: 60.0,
                h: 60.0
            }
        );
    }

    #[test]
    fn nearby_victim_overlaps() {
        let hit_box = CombatSystem::hit_box(100.0, 100.0);
        assert!(Rect::player(110.0, 110.0).overlaps(&hit_box));
    }

    #[test]
    fn touching_edges_count_as_overlap() {
        let hit_box = CombatSystem::hit_box(100.0, 100.0);
        // right edge of victim meets left edge of hit-box
        assert!(Rect::player(60.0, 100.0).overlaps(&hit_box));
        // left edge of victim meets right edge of hit-box
        assert!(Rect::player(140.0, 140.0).overlaps(&hit_box));
    }

    #[test]
    fn overlap_needs_both_axes() {
        let hit_box = CombatSystem::hit_box(100.0, 100.0);
        assert!(!Rect::player(110.0, 200.0).overlaps(&hit_box));
        assert!(!Rect::player(141.0, 110.0).overlaps(&hit_box));
    }

    #[test]
    fn cooldown_gates_swings() {
        let now = Instant::now();
        assert!(CombatSystem::can_swing(None, now));
        assert!(!CombatSystem::can_swing(
            Some(now),
            now + Duration::from_millis(1499)
        ));
        assert!(CombatSystem::can_swing(Some(now), now + HIT_COOLDOWN));
    }
}
