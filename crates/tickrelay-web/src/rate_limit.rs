use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

use crate::error::ApiError;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Inbound rate gates: global daily/hourly quotas plus a tighter
/// per-minute quota on the price-bars endpoint. `/health` bypasses all
/// gates.
pub struct RequestGates {
    daily: DirectRateLimiter,
    hourly: DirectRateLimiter,
    bars_minute: DirectRateLimiter,
}

impl RequestGates {
    pub fn new(per_day: u32, per_hour: u32, bars_per_minute: u32) -> Self {
        Self {
            daily: RateLimiter::direct(quota_from_window(
                Duration::from_secs(24 * 60 * 60),
                per_day,
            )),
            hourly: RateLimiter::direct(quota_from_window(Duration::from_secs(60 * 60), per_hour)),
            bars_minute: RateLimiter::direct(quota_from_window(
                Duration::from_secs(60),
                bars_per_minute,
            )),
        }
    }

    /// Global quota shared by all data endpoints.
    pub fn check_global(&self) -> Result<(), ApiError> {
        if self.daily.check().is_err() || self.hourly.check().is_err() {
            return Err(ApiError::RateLimited(String::from("Rate limit exceeded")));
        }
        Ok(())
    }

    /// Additional quota applied to the price-bars endpoint only.
    pub fn check_bars(&self) -> Result<(), ApiError> {
        self.bars_minute.check().map_err(|_| {
            ApiError::RateLimited(String::from("Rate limit exceeded for stock data"))
        })
    }
}

fn quota_from_window(window: Duration, limit: u32) -> Quota {
    let safe_limit = limit.max(1);
    let burst = NonZeroU32::new(safe_limit).expect("safe limit must be non-zero");

    let seconds_per_cell = (window.as_secs_f64() / f64::from(safe_limit)).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    Quota::with_period(period)
        .expect("period is always greater than zero")
        .allow_burst(burst)
}
