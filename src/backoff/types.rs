//! Backoff state and presets

use rand::Rng;
use std::time::Duration;

/// Delay schedule for retries.
///
/// Each call to [`Backoff::step`] returns the delay to sleep before the next
/// attempt and advances the schedule. The returned delay is the current base
/// duration plus a random extra of up to `jitter` times that duration. The
/// base grows by `factor` after every step and stops at `cap` (a zero cap
/// means unbounded). A factor of 1 or less keeps the base constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    /// Base delay of the next step
    pub duration: Duration,
    /// Growth factor applied after each step
    pub factor: f64,
    /// Maximum random extra, as a fraction of the base delay
    pub jitter: f64,
    /// Upper bound of the base delay, zero for none
    pub cap: Duration,
}

impl Backoff {
    /// Schedule suited to Google APIs
    pub const API: Backoff = Backoff {
        duration: Duration::from_secs(1),
        factor: 1.2,
        jitter: 0.5,
        cap: Duration::from_secs(10),
    };

    /// General purpose schedule
    pub const DEFAULT: Backoff = Backoff {
        duration: Duration::from_millis(10),
        factor: 4.0,
        jitter: 0.2,
        cap: Duration::from_secs(10),
    };

    /// Create a new backoff schedule
    pub fn new(duration: Duration, factor: f64, jitter: f64, cap: Duration) -> Self {
        Self {
            duration,
            factor,
            jitter,
            cap,
        }
    }

    /// Fixed rate schedule without jitter, used for polling
    pub const fn constant(duration: Duration) -> Self {
        Self {
            duration,
            factor: 1.0,
            jitter: 0.0,
            cap: Duration::ZERO,
        }
    }

    /// Return the next delay and advance the schedule
    pub fn step(&mut self) -> Duration {
        self.step_with(&mut rand::rng())
    }

    /// Same as [`Backoff::step`] with an explicit source of randomness
    pub fn step_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Duration {
        let base = self.duration;

        let delay = if self.jitter > 0.0 {
            let extra = base.as_secs_f64() * self.jitter * rng.random::<f64>();
            base.saturating_add(saturating_secs(extra))
        } else {
            base
        };

        if self.factor > 1.0 {
            let grown = saturating_secs(base.as_secs_f64() * self.factor);
            self.duration = if self.cap.is_zero() {
                grown
            } else {
                grown.min(self.cap)
            };
        }

        delay
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn saturating_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
