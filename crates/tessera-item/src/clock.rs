#![forbid(unsafe_code)]

//! Time source for stall deadlines.
//!
//! Items never read the wall clock directly: the start instant of every
//! transition comes from the [`Clock`] in their [`ItemContext`], and the host
//! passes an instant from the same clock to [`Item::expire_stalled`]. Hosts
//! driving frames from a virtual timeline share one [`ManualClock`] between
//! themselves and the context.
//!
//! [`ItemContext`]: crate::item::ItemContext
//! [`Item::expire_stalled`]: crate::item::Item::expire_stalled

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use web_time::Instant;

/// Monotonic time source.
pub trait Clock: fmt::Debug + Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// The platform monotonic clock (`performance.now()` on wasm).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Host-driven clock. Time moves only when the host sets or advances it.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed_nanos: AtomicU64,
}

impl ManualClock {
    /// Create a clock reading the current instant, frozen until advanced.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a clock frozen at `origin`.
    pub fn starting_at(origin: Instant) -> Self {
        Self {
            origin,
            elapsed_nanos: AtomicU64::new(0),
        }
    }

    /// Time elapsed since the origin.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.load(Ordering::Acquire))
    }

    /// Set the time elapsed since the origin.
    pub fn set(&self, elapsed: Duration) {
        self.elapsed_nanos.store(saturating_nanos(elapsed), Ordering::Release);
    }

    /// Advance by `dt`.
    pub fn advance(&self, dt: Duration) {
        let dt = saturating_nanos(dt);
        let _ = self
            .elapsed_nanos
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |now| {
                Some(now.saturating_add(dt))
            });
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let elapsed = self.elapsed();
        self.origin.checked_add(elapsed).unwrap_or(self.origin)
    }
}

fn saturating_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
