//! Bounded polling with a fixed sleep between attempts

use embedded_hal::delay::DelayNs;

/// Attempt cap and inter-attempt delay for a polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Retry {
    /// Maximum number of attempts
    pub attempts: u32,
    /// Sleep after each failed attempt, in milliseconds
    pub interval_ms: u32,
}

impl Retry {
    /// Create a retry policy
    #[must_use]
    pub const fn new(attempts: u32, interval_ms: u32) -> Self {
        Self {
            attempts,
            interval_ms,
        }
    }

    /// Call `attempt` until it yields a value or the attempt cap is reached
    ///
    /// Sleeps `interval_ms` after every attempt that returns `None`. There is
    /// no early cancellation.
    pub fn poll<D, T, F>(&self, delay: &mut D, mut attempt: F) -> Option<T>
    where
        D: DelayNs,
        F: FnMut() -> Option<T>,
    {
        for _ in 0..self.attempts {
            if let Some(value) = attempt() {
                return Some(value);
            }
            delay.delay_ms(self.interval_ms);
        }
        None
    }
}
