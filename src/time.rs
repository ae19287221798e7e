//! Fixed-timestep game clock using an accumulator pattern.
//!
//! `draw_web()` calls at ~60fps with variable delta. FrameClock converts
//! this into discrete one-second income ticks, making game logic
//! deterministic and fully testable.
//!
//! Per-frame delta is clamped to 250ms so a single huge frame gap (tab
//! backgrounded, laptop lid closed) cannot inject unbounded income. Long
//! absences are handled separately by the offline-progress credit at load.

/// Maximum wall-clock delta accepted from a single frame, in seconds.
pub const MAX_FRAME_DELTA_SECS: f64 = 0.25;

pub struct FrameClock {
    /// Timestamp of the last frame (ms), None if first frame.
    last_frame_ms: Option<f64>,
    /// Accumulated fractional seconds not yet consumed as ticks.
    carry: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_frame_ms: None,
            carry: 0.0,
        }
    }

    /// Feed a wall-clock timestamp (from `performance.now()` or similar).
    /// Returns the number of whole seconds of income to apply this frame.
    ///
    /// Call this once per draw frame. The returned count should be passed
    /// to `SmithGame::tick(seconds)`.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let dt = match self.last_frame_ms {
            Some(prev) => ((now_ms - prev) / 1000.0).clamp(0.0, MAX_FRAME_DELTA_SECS),
            None => 0.0, // First frame: no delta
        };
        self.last_frame_ms = Some(now_ms);

        self.carry += dt;
        let seconds = self.carry as u32;
        self.carry -= seconds as f64;
        seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_returns_zero_seconds() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.update(0.0), 0);
    }

    #[test]
    fn one_second_accumulates_to_one_tick() {
        let mut clock = FrameClock::new();
        clock.update(0.0);
        let mut total = 0u32;
        // 60 frames at ~16.67ms each = 1 second
        for i in 1..=60 {
            total += clock.update(i as f64 * 16.667);
        }
        assert_eq!(total, 1);
    }

    #[test]
    fn sub_second_frames_carry_over() {
        let mut clock = FrameClock::new();
        clock.update(0.0);
        assert_eq!(clock.update(600.0), 0); // 0.6s gap clamped to 0.25
        assert_eq!(clock.update(800.0), 0); // +0.2 = 0.45
        assert_eq!(clock.update(1000.0), 0); // +0.2 = 0.65
        assert_eq!(clock.update(1200.0), 0); // +0.2 = 0.85
        assert_eq!(clock.update(1400.0), 1); // +0.2 = 1.05 → 1 tick, 0.05 carry
    }

    #[test]
    fn stall_frames_are_clamped() {
        // Frames at 0, 1500ms, 1600ms: the 1.5s gap is clamped to 0.25s,
        // so at most 0.5s of simulated time accumulates — no tick fires.
        let mut clock = FrameClock::new();
        assert_eq!(clock.update(0.0), 0);
        assert_eq!(clock.update(1500.0), 0);
        assert_eq!(clock.update(1600.0), 0);
    }

    #[test]
    fn backgrounded_tab_cannot_inject_income() {
        let mut clock = FrameClock::new();
        clock.update(0.0);
        // 10 minute gap: clamped to a single 0.25s delta
        assert_eq!(clock.update(600_000.0), 0);
    }

    #[test]
    fn negative_delta_is_ignored() {
        let mut clock = FrameClock::new();
        clock.update(1000.0);
        // Timestamp going backwards must not produce ticks or negative carry
        assert_eq!(clock.update(500.0), 0);
        assert_eq!(clock.update(1500.0), 0); // 1.0s delta clamped to 0.25
    }

    #[test]
    fn steady_rate_tracks_wall_clock() {
        let mut clock = FrameClock::new();
        clock.update(0.0);
        let mut total = 0u32;
        // 10 seconds of steady 60fps frames
        for i in 1..=600 {
            total += clock.update(i as f64 * 16.667);
        }
        assert!((9..=10).contains(&total), "expected ~10 ticks, got {}", total);
    }
}
