//! Fire-control gate shared by every timed actor.
//!
//! The gate accumulates *simulation* time handed to it by the tick, never wall
//! time, so a paused session (upgrade selection) freezes every cooldown with
//! it.  A fresh timer starts ready: a weapon granted mid-run fires on its
//! first tick.

/// Accumulating cooldown gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CooldownTimer {
    duration: f32,
    elapsed: f32,
}

impl CooldownTimer {
    /// New gate that is immediately ready.
    pub fn new(duration: f32) -> Self {
        let duration = duration.max(0.0);
        Self {
            duration,
            elapsed: duration,
        }
    }

    /// New gate that only becomes ready after a full `duration`.
    pub fn new_elapsed_zero(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
        }
    }

    #[inline]
    pub fn tick(&mut self, dt: f32) {
        // Saturate so a long idle stretch can't bank extra shots.
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration.max(f32::EPSILON) * 2.0);
    }

    #[inline]
    pub fn ready(&self) -> bool {
        self.elapsed >= self.duration
    }

    #[inline]
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    /// If ready, reset and return `true`.
    pub fn try_fire(&mut self) -> bool {
        if self.ready() {
            self.reset();
            true
        } else {
            false
        }
    }

    /// Fraction of the cooldown elapsed, `1.0` when ready.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Change the duration without losing time already accumulated.
    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration.max(0.0);
    }
}
