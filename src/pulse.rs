//! Heartbeat pacing: turns wall-clock time into an outline scale in [0, 1].

use crate::config::PulseConfig;

/// Longest frame the clock will integrate. Slower hosts (throttled windows,
/// debuggers) get the same pulse shape at a lower frame rate instead of a
/// jump.
pub const MAX_FRAME_DT: f32 = 1.0 / 30.0;

/// Phase accumulator for the heartbeat.
///
/// The phase does not advance uniformly: the relaxed half of the cycle is
/// crossed quickly and the beat lingers near its peak, which is what makes
/// the motion read as a heartbeat rather than a sine wave.
pub struct PulseClock {
    phase: f32,
}

impl PulseClock {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Advance the phase by a clamped frame delta and return the new scale.
    pub fn advance(&mut self, dt: f32, config: &PulseConfig) -> f32 {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.phase += self.gait() * config.rate * dt;
        self.scale()
    }

    /// Current outline scale factor: 0 at rest, 1 at the peak of the beat.
    pub fn scale(&self) -> f32 {
        0.5 * (1.0 - self.phase.cos())
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Rate multiplier for the current phase: rush the recovery half, linger
    /// near the peak.
    fn gait(&self) -> f32 {
        let n = -self.phase.cos();
        if self.phase.sin() < 0.0 {
            9.0
        } else if n > 0.8 {
            0.2
        } else {
            1.0
        }
    }
}

impl Default for PulseClock {
    fn default() -> Self {
        Self::new()
    }
}
