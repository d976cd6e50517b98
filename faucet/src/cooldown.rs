//! Cooldown eligibility.
//!
//! Claim and lottery cooldowns are two independent instances of the same
//! gate over different timestamp fields. Pure functions of account state
//! and the current time.

use driplet_types::Timestamp;

/// Whether enough time has passed since `last` to act again. An absent
/// `last` means the user has never acted, so they are eligible. The exact
/// boundary counts as eligible.
pub fn eligible(now: Timestamp, last: Option<Timestamp>, cooldown_secs: u64) -> bool {
    match last {
        None => true,
        Some(last) => last.elapsed_since(now) >= cooldown_secs,
    }
}

/// Seconds until the gate opens; zero when already eligible.
pub fn remaining(now: Timestamp, last: Option<Timestamp>, cooldown_secs: u64) -> u64 {
    match last {
        None => 0,
        Some(last) => cooldown_secs.saturating_sub(last.elapsed_since(now)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_acted_is_eligible() {
        assert!(eligible(Timestamp::new(0), None, 3600));
        assert_eq!(remaining(Timestamp::new(0), None, 3600), 0);
    }

    #[test]
    fn inside_window_is_blocked() {
        let last = Some(Timestamp::new(1000));
        assert!(!eligible(Timestamp::new(1001), last, 3600));
        assert_eq!(remaining(Timestamp::new(1001), last, 3600), 3599);
    }

    #[test]
    fn exact_boundary_is_eligible() {
        let last = Some(Timestamp::new(1000));
        assert!(eligible(Timestamp::new(4600), last, 3600));
        assert_eq!(remaining(Timestamp::new(4600), last, 3600), 0);
    }

    #[test]
    fn clock_regression_does_not_underflow() {
        // A last timestamp in the future reads as zero elapsed.
        let last = Some(Timestamp::new(5000));
        assert!(!eligible(Timestamp::new(1000), last, 3600));
        assert_eq!(remaining(Timestamp::new(1000), last, 3600), 3600);
    }
}
