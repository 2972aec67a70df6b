//! Time utilities for the room simulation

use std::time::{Duration, Instant};

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Elapsed time between two instants in fractional milliseconds.
///
/// Saturates to zero if `later` precedes `earlier`.
pub fn elapsed_millis(earlier: Instant, later: Instant) -> f64 {
    later
        .checked_duration_since(earlier)
        .unwrap_or(Duration::ZERO)
        .as_secs_f64()
        * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_millis_is_fractional() {
        let start = Instant::now();
        let later = start + Duration::from_micros(16_500);
        assert!((elapsed_millis(start, later) - 16.5).abs() < 1e-9);
    }

    #[test]
    fn elapsed_millis_saturates_backwards() {
        let start = Instant::now();
        let later = start + Duration::from_millis(5);
        assert_eq!(elapsed_millis(later, start), 0.0);
    }

    #[test]
    fn uptime_starts_after_init() {
        init_server_time();
        assert!(uptime_secs() < 60);
    }
}
