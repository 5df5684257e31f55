//! Frame clock
//!
//! Turns the timestamps handed to a display-refresh callback into a bounded
//! delta for the simulation. Owns no game state.

use crate::consts::MAX_FRAME_MS;

/// Converts wall-clock frame callbacks into bounded delta-times
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt_ms: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_max_delta(MAX_FRAME_MS)
    }

    /// Clock that never reports a delta larger than `max_dt_ms`
    pub fn with_max_delta(max_dt_ms: f32) -> Self {
        Self {
            last_ms: None,
            max_dt_ms: max_dt_ms.max(0.0),
        }
    }

    /// Feed the timestamp of the current frame, get the delta to simulate.
    ///
    /// The first frame after construction or `reset` yields 0. Timestamps
    /// that run backwards also yield 0 rather than a negative step.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) as f32).clamp(0.0, self.max_dt_ms),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt
    }

    /// Forget the previous timestamp (after a pause or a new run)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
