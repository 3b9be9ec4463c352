//! Exponential ease-out for the pull indicator.
//!
//! While the pointer is down the indicator follows it exactly
//! ([`SnapBack::track`]).  Once released, each tick closes a fixed fraction
//! of the gap to the target row count, so the content slides back up by a
//! few rows per frame with visible deceleration.

/// Row-offset animator for the pull indicator.
#[derive(Debug, Clone)]
pub struct SnapBack {
    /// Rows currently shown.
    rows: f64,
    /// Fraction of the remaining gap closed per tick.
    /// Good range: 0.25–0.45 at 20 fps.
    speed: f64,
}

impl SnapBack {
    pub fn new(speed: f64) -> Self {
        Self {
            rows: 0.0,
            speed: speed.clamp(0.05, 0.95),
        }
    }

    /// Jump straight to `target` (pointer is down).
    pub fn track(&mut self, target: f64) {
        self.rows = target.max(0.0);
    }

    /// Ease toward `target`.  Call once per frame.
    pub fn tick(&mut self, target: f64) {
        let target = target.max(0.0);
        self.rows += (target - self.rows) * self.speed;
        if (self.rows - target).abs() < 0.4 {
            self.rows = target;
        }
    }

    /// Rows to push the content down by.
    pub fn rows(&self) -> u16 {
        self.rows.round() as u16
    }

    /// True while still moving toward `target`.
    pub fn is_animating(&self, target: f64) -> bool {
        self.rows != target.max(0.0)
    }
}
