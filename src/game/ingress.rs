//! Ingress filter - sanity gate in front of every room inbound queue

use crate::ws::protocol::{InboundMsg, InboundStatus};

use super::constants::MAX_SPEED;

/// Whether an inbound intent may be forwarded to its room.
///
/// A `move` passes only from an alive sender with both velocity components
/// within `±MAX_SPEED`. Every other status passes.
pub fn admit(msg: &InboundMsg, sender_alive: bool) -> bool {
    match msg.status {
        InboundStatus::Move => {
            let (x_s, y_s) = msg.velocity();
            sender_alive && within_speed(x_s) && within_speed(y_s)
        }
        InboundStatus::Connected => true,
    }
}

fn within_speed(component: f64) -> bool {
    (-MAX_SPEED..=MAX_SPEED).contains(&component)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_bounded_move_from_alive_player() {
        assert!(admit(&InboundMsg::movement(0.2, -0.2), true));
        assert!(admit(&InboundMsg::movement(0.0, 0.05), true));
    }

    #[test]
    fn rejects_fast_move() {
        assert!(!admit(&InboundMsg::movement(0.21, 0.0), true));
        assert!(!admit(&InboundMsg::movement(0.0, -0.3), true));
    }

    #[test]
    fn rejects_non_finite_velocity() {
        assert!(!admit(&InboundMsg::movement(f64::NAN, 0.0), true));
        assert!(!admit(&InboundMsg::movement(0.0, f64::INFINITY), true));
    }

    #[test]
    fn rejects_any_move_from_dead_player() {
        assert!(!admit(&InboundMsg::movement(0.0, 0.0), false));
        assert!(!admit(&InboundMsg::movement(0.1, 0.1).with_text("hit"), false));
    }

    #[test]
    fn connected_always_passes() {
        assert!(admit(&InboundMsg::connected("main", "alice"), true));
        assert!(admit(&InboundMsg::connected("main", "alice"), false));
    }
}
