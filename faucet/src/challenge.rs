//! Human-verification challenges.
//!
//! Each claim or lottery attempt is gated by a small arithmetic puzzle. At
//! most one challenge is live per user; issuing overwrites any earlier one,
//! and resolving removes the challenge before evaluating the answer so a
//! racing second submission observes no active challenge. That
//! consume-before-evaluate ordering is the mechanism that serializes
//! concurrent attempts from the same user.

use driplet_types::{Timestamp, UserId};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;

/// Operands are drawn from this range.
const OPERAND_RANGE: std::ops::RangeInclusive<u32> = 1..=10;
/// Answer set size, correct answer included.
const OPTION_COUNT: usize = 3;
/// Decoys land within this distance of the correct answer.
const DECOY_SPREAD: u32 = 5;

/// Which operation a challenge gates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChallengeTag {
    Claim,
    Lottery,
}

#[derive(Clone, Debug)]
pub struct Challenge {
    pub tag: ChallengeTag,
    pub question: String,
    pub answer: u32,
    /// Correct answer plus decoys, shuffled. All positive, all distinct.
    pub options: Vec<u32>,
    pub issued_at: Timestamp,
}

impl Challenge {
    fn generate<R: Rng + ?Sized>(tag: ChallengeTag, rng: &mut R, now: Timestamp) -> Self {
        let a = rng.gen_range(OPERAND_RANGE);
        let b = rng.gen_range(OPERAND_RANGE);
        let answer = a + b;

        let mut options = vec![answer];
        while options.len() < OPTION_COUNT {
            let low = answer.saturating_sub(DECOY_SPREAD).max(1);
            let high = answer + DECOY_SPREAD;
            let decoy = rng.gen_range(low..=high);
            if !options.contains(&decoy) {
                options.push(decoy);
            }
        }
        options.shuffle(rng);

        Self {
            tag,
            question: format!("{a} + {b} = ?"),
            answer,
            options,
            issued_at: now,
        }
    }

    fn expired(&self, now: Timestamp, expiry_secs: u64) -> bool {
        self.issued_at.has_expired(expiry_secs, now)
    }
}

/// Outcome of one answer submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing live for this user: never issued, already consumed by a
    /// racing submission, or expired.
    NoActiveChallenge,
    Correct(ChallengeTag),
    Incorrect(ChallengeTag),
}

/// Owns all live challenges, keyed by user.
pub struct ChallengeManager {
    live: Mutex<HashMap<UserId, Challenge>>,
    expiry_secs: u64,
}

impl ChallengeManager {
    pub fn new(expiry_secs: u64) -> Self {
        Self {
            live: Mutex::new(HashMap::new()),
            expiry_secs,
        }
    }

    /// Generate and store a fresh challenge for `user`, replacing any
    /// earlier one. Returns a copy for presentation.
    pub fn issue<R: Rng + ?Sized>(
        &self,
        user: UserId,
        tag: ChallengeTag,
        rng: &mut R,
        now: Timestamp,
    ) -> Challenge {
        let challenge = Challenge::generate(tag, rng, now);
        self.live.lock().unwrap().insert(user, challenge.clone());
        challenge
    }

    /// Remove the live challenge for `user`, then evaluate `submitted`
    /// against it. The removal happens unconditionally, so the caller must
    /// re-issue on [`Resolution::Incorrect`].
    pub fn resolve(&self, user: UserId, submitted: u32, now: Timestamp) -> Resolution {
        let challenge = match self.live.lock().unwrap().remove(&user) {
            Some(c) => c,
            None => return Resolution::NoActiveChallenge,
        };
        if challenge.expired(now, self.expiry_secs) {
            return Resolution::NoActiveChallenge;
        }
        if submitted == challenge.answer {
            Resolution::Correct(challenge.tag)
        } else {
            Resolution::Incorrect(challenge.tag)
        }
    }

    /// Drop every expired challenge. Returns how many were removed.
    pub fn purge_expired(&self, now: Timestamp) -> usize {
        let mut live = self.live.lock().unwrap();
        let before = live.len();
        live.retain(|_, c| !c.expired(now, self.expiry_secs));
        before - live.len()
    }

    pub fn active(&self, user: UserId, now: Timestamp) -> bool {
        self.live
            .lock()
            .unwrap()
            .get(&user)
            .is_some_and(|c| !c.expired(now, self.expiry_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn generated_options_are_distinct_and_contain_the_answer() {
        let mut rng = rng();
        for _ in 0..200 {
            let c = Challenge::generate(ChallengeTag::Claim, &mut rng, Timestamp::EPOCH);
            assert_eq!(c.options.len(), OPTION_COUNT);
            assert!(c.options.contains(&c.answer));
            assert!(c.options.iter().all(|&o| o >= 1));
            let mut sorted = c.options.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), OPTION_COUNT);
        }
    }

    #[test]
    fn correct_answer_resolves_and_consumes() {
        let manager = ChallengeManager::new(300);
        let mut rng = rng();
        let user = UserId::new(1);
        let c = manager.issue(user, ChallengeTag::Claim, &mut rng, Timestamp::EPOCH);

        assert_eq!(
            manager.resolve(user, c.answer, Timestamp::EPOCH),
            Resolution::Correct(ChallengeTag::Claim)
        );
        // Consumed: a second submission finds nothing.
        assert_eq!(
            manager.resolve(user, c.answer, Timestamp::EPOCH),
            Resolution::NoActiveChallenge
        );
    }

    #[test]
    fn incorrect_answer_consumes_too() {
        let manager = ChallengeManager::new(300);
        let mut rng = rng();
        let user = UserId::new(1);
        let c = manager.issue(user, ChallengeTag::Lottery, &mut rng, Timestamp::EPOCH);

        let wrong = c.answer + 1;
        assert_eq!(
            manager.resolve(user, wrong, Timestamp::EPOCH),
            Resolution::Incorrect(ChallengeTag::Lottery)
        );
        assert!(!manager.active(user, Timestamp::EPOCH));
    }

    #[test]
    fn reissue_overwrites_the_previous_challenge() {
        let manager = ChallengeManager::new(300);
        let mut rng = rng();
        let user = UserId::new(1);
        let _first = manager.issue(user, ChallengeTag::Claim, &mut rng, Timestamp::EPOCH);
        let second = manager.issue(user, ChallengeTag::Claim, &mut rng, Timestamp::EPOCH);

        // Only the latest answer counts.
        assert_eq!(
            manager.resolve(user, second.answer, Timestamp::EPOCH),
            Resolution::Correct(ChallengeTag::Claim)
        );
    }

    #[test]
    fn expired_challenge_reads_as_absent() {
        let manager = ChallengeManager::new(300);
        let mut rng = rng();
        let user = UserId::new(1);
        let c = manager.issue(user, ChallengeTag::Claim, &mut rng, Timestamp::new(1000));

        // Live strictly inside the window; the boundary second is expired,
        // matching the cooldown gate's boundary.
        assert!(manager.active(user, Timestamp::new(1299)));
        assert_eq!(
            manager.resolve(user, c.answer, Timestamp::new(1300)),
            Resolution::NoActiveChallenge
        );
    }

    #[test]
    fn purge_removes_only_expired_entries() {
        let manager = ChallengeManager::new(300);
        let mut rng = rng();
        manager.issue(UserId::new(1), ChallengeTag::Claim, &mut rng, Timestamp::new(0));
        manager.issue(UserId::new(2), ChallengeTag::Claim, &mut rng, Timestamp::new(500));

        assert_eq!(manager.purge_expired(Timestamp::new(600)), 1);
        assert!(!manager.active(UserId::new(1), Timestamp::new(600)));
        assert!(manager.active(UserId::new(2), Timestamp::new(600)));
    }

    #[test]
    fn challenges_are_per_user() {
        let manager = ChallengeManager::new(300);
        let mut rng = rng();
        let a = UserId::new(1);
        let b = UserId::new(2);
        let ca = manager.issue(a, ChallengeTag::Claim, &mut rng, Timestamp::EPOCH);
        manager.issue(b, ChallengeTag::Lottery, &mut rng, Timestamp::EPOCH);

        assert_eq!(
            manager.resolve(a, ca.answer, Timestamp::EPOCH),
            Resolution::Correct(ChallengeTag::Claim)
        );
        assert!(manager.active(b, Timestamp::EPOCH));
    }
}
