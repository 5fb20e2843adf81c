use crate::machine::{FRAMES_PER_SECOND, INSTRUCTIONS_PER_FRAME};

/// Upper bound on the elapsed time credited by a single tick. Bounds the
/// catch-up work after a host stall (window drag, suspend, long GC in the
/// compositor) to three frames' worth of instructions.
pub const MAX_TICK_MS: f64 = 50.0;

const INSTRUCTIONS_PER_MS: f64 =
    INSTRUCTIONS_PER_FRAME as f64 * FRAMES_PER_SECOND as f64 / 1000.0;

/// Converts wall-clock time into an instruction budget.
///
/// Fractional instructions carry over between ticks, so long-run throughput
/// matches the target rate no matter how the host slices its callbacks.
pub struct Pacer {
    carry: f64,
    speed: f64,
    paused: bool,
}

impl Pacer {
    pub fn new() -> Self {
        Self {
            carry: 0.0,
            speed: 1.0,
            paused: false,
        }
    }

    /// Credit `elapsed_ms` of wall-clock time and return the number of whole
    /// instructions now due. Always zero while paused; paused time is never
    /// backfilled on resume.
    pub fn budget(&mut self, elapsed_ms: f64) -> u64 {
        if self.paused {
            return 0;
        }
        let elapsed = elapsed_ms.clamp(0.0, MAX_TICK_MS);
        self.carry += INSTRUCTIONS_PER_MS * self.speed * elapsed;
        let whole = self.carry.floor();
        self.carry -= whole;
        whole as u64
    }

    /// Speed multiplier relative to real time. Negative values clamp to zero.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.max(0.0);
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new()
    }
}
