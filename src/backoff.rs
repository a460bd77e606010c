//! Retry delay calculation with exponential backoff and jitter.
//!
//! The retry loop itself belongs to the caller. [`Backoff`] only answers "how
//! long to wait before attempt N".
//!
//! # Formula
//!
//! - `attempt < 0`: exactly `min_delay`.
//! - otherwise: `min_delay * 1.5^attempt + jitter`, where `jitter` is uniform
//!   in `[0, min_delay)`, clamped to `max_delay`.
//!
//! The jitter window is always `min_delay` wide, no matter how far the
//! exponential term has grown.
//!
//! # Configuration
//!
//! - `min_delay`: floor and jitter width (default: 100ms)
//! - `max_delay`: ceiling (default: 2s)
//!
//! # Example
//!
//! ```
//! use procwire_rpc::Backoff;
//! use std::time::Duration;
//!
//! let backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(2)).unwrap();
//! assert_eq!(backoff.next(-1), Duration::from_millis(100));
//! assert_eq!(backoff.next(10), Duration::from_secs(2));
//! ```

use std::time::Duration;

use rand::Rng;

use crate::error::{ProcwireError, Result};

/// Default delay floor.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(100);

/// Default delay ceiling.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(2);

/// Growth per attempt.
const GROWTH_FACTOR: f64 = 1.5;

/// Exponential backoff with additive jitter.
///
/// Stateless and `Copy`: every call is a pure function of the attempt
/// number plus the jitter sample, so one value can serve any number of
/// concurrent retriers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    min_delay: Duration,
    max_delay: Duration,
}

impl Backoff {
    /// Create a backoff policy.
    ///
    /// # Errors
    ///
    /// Returns [`ProcwireError::Config`] if `min_delay > max_delay`.
    pub fn new(min_delay: Duration, max_delay: Duration) -> Result<Self> {
        if min_delay > max_delay {
            return Err(ProcwireError::Config(format!(
                "backoff min_delay {:?} exceeds max_delay {:?}",
                min_delay, max_delay
            )));
        }

        Ok(Self {
            min_delay,
            max_delay,
        })
    }

    /// Delay floor.
    #[inline]
    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Delay ceiling.
    #[inline]
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Delay before the given attempt, with random jitter.
    pub fn next(&self, attempt: i32) -> Duration {
        if attempt < 0 {
            return self.min_delay;
        }

        let jitter: f64 = rand::rng().random();
        self.next_with_jitter(attempt, jitter)
    }

    /// Delay before the given attempt, using `jitter` as the uniform sample.
    ///
    /// `jitter` is expected in `[0, 1)` and is clamped into `[0, 1]`.
    pub fn next_with_jitter(&self, attempt: i32, jitter: f64) -> Duration {
        if attempt < 0 {
            return self.min_delay;
        }

        let min = self.min_delay.as_nanos() as f64;
        let max = self.max_delay.as_nanos() as f64;
        let jitter = if jitter.is_nan() { 0.0 } else { jitter.clamp(0.0, 1.0) };

        let delay = min * GROWTH_FACTOR.powi(attempt) + jitter * min;
        if !delay.is_finite() || delay >= max {
            return self.max_delay;
        }

        // Past u64::MAX nanoseconds `as u64` would saturate below the base.
        let delay = if delay < u64::MAX as f64 {
            Duration::from_nanos(delay as u64)
        } else {
            Duration::try_from_secs_f64(delay / 1e9).unwrap_or(self.max_delay)
        };

        delay.clamp(self.min_delay, self.max_delay)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            min_delay: DEFAULT_MIN_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}
