//! Rate limiting for attempt launches.
//!
//! Token bucket over `governor`. A rate of 0 means "launch as fast as the
//! runtime allows", which is represented by not having a limiter at all.

use governor::{DefaultDirectRateLimiter, Quota};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Caps how many attempts are launched per second.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl RateLimiter {
    /// Create a limiter allowing `rate` launches per second.
    ///
    /// Returns `None` for a rate of 0 (unlimited).
    pub fn per_second(rate: u32) -> Option<Self> {
        let rate = NonZeroU32::new(rate)?;
        Some(Self {
            limiter: Arc::new(DefaultDirectRateLimiter::direct(Quota::per_second(rate))),
        })
    }

    /// Wait until the next launch is allowed.
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}
