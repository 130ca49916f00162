//! Cancellable periodic tasks driven by the host frame loop.
//!
//! Nothing here owns a thread or a timer. The host calls [`PeriodicTask::poll`]
//! once per rendered frame with the elapsed wall-clock time and runs the
//! returned number of steps.

use std::cell::Cell;
use std::rc::Rc;

use crate::config;

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent.
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cadence {
    /// One step per host frame.
    EveryFrame,
    /// One step per elapsed interval of wall-clock time, in seconds.
    Interval(f64),
}

impl Cadence {
    pub fn label(self) -> &'static str {
        match self {
            Cadence::EveryFrame => "frame",
            Cadence::Interval(_) => "interval",
        }
    }
}

#[derive(Debug)]
pub struct PeriodicTask {
    cadence: Cadence,
    token: CancelToken,
    accumulator: f64,
}

impl PeriodicTask {
    pub fn new(cadence: Cadence) -> Self {
        Self {
            cadence,
            token: CancelToken::new(),
            accumulator: 0.0,
        }
    }

    pub fn every_frame() -> Self {
        Self::new(Cadence::EveryFrame)
    }

    pub fn interval(secs: f64) -> Self {
        Self::new(Cadence::Interval(secs))
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Number of steps due after `frame_time` seconds. Frame time is clamped so a
    /// stalled frame cannot trigger an unbounded burst of interval steps.
    pub fn poll(&mut self, frame_time: f64) -> u32 {
        if self.token.is_cancelled() {
            return 0;
        }
        match self.cadence {
            Cadence::EveryFrame => 1,
            Cadence::Interval(secs) if secs <= 0.0 || secs.is_nan() => 0,
            Cadence::Interval(secs) => {
                self.accumulator += frame_time.clamp(0.0, config::MAX_FRAME_TIME);
                let due = (self.accumulator / secs)
                    .floor()
                    .min(config::MAX_STEPS_PER_POLL as f64);
                self.accumulator -= due * secs;
                // Steps past the cap are dropped, not carried into later frames.
                if self.accumulator >= secs {
                    self.accumulator %= secs;
                }
                self.accumulator = self.accumulator.max(0.0);
                due as u32
            }
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
