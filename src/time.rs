//! Monotonic time source for the rate limiter

/// Millisecond clock
///
/// Must be monotonic. On embassy targets this is typically
/// `embassy_time::Instant::now().as_millis()`.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
