use time::OffsetDateTime;

/// Time source injected into the cache and the HTTP layer.
///
/// Components never reach for ambient wall-clock time directly; tests
/// substitute a manually advanced clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Production clock reading UTC system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
