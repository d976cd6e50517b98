//! Manually advanced clock.

use driplet_types::{Clock, Timestamp};
use std::sync::atomic::{AtomicU64, Ordering};

/// A [`Clock`] that only moves when told to. Shared freely across tasks.
pub struct NullClock {
    now_secs: AtomicU64,
}

impl NullClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now_secs: AtomicU64::new(start.as_secs()),
        }
    }

    /// Starts at a round, recognizable epoch offset.
    pub fn at_noon() -> Self {
        Self::new(Timestamp::new(1_700_000_000))
    }

    pub fn advance(&self, secs: u64) {
        self.now_secs.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, now: Timestamp) {
        self.now_secs.store(now.as_secs(), Ordering::SeqCst);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.now_secs.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_moves_time_forward() {
        let clock = NullClock::new(Timestamp::new(100));
        assert_eq!(clock.now(), Timestamp::new(100));
        clock.advance(50);
        assert_eq!(clock.now(), Timestamp::new(150));
    }

    #[test]
    fn set_jumps_to_an_absolute_time() {
        let clock = NullClock::at_noon();
        clock.set(Timestamp::new(42));
        assert_eq!(clock.now(), Timestamp::new(42));
    }
}
