//! Backoff policy for rate-limited (429) responses.

use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Exponential backoff with jitter, bounded by a retry budget.
///
/// Computes `min(base * 2^attempt, cap)` plus a uniform jitter in
/// `[0, wait/4)`. A positive server hint replaces the computation entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Wait before the first retry (default: 1s)
    pub base: Duration,
    /// Upper bound on the exponential part (default: 30s)
    pub cap: Duration,
    /// Retries allowed after the initial dispatch (default: 3)
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            cap: Duration::from_secs(30),
            max_attempts: 3,
        }
    }
}

impl BackoffPolicy {
    /// Wait before retry number `attempt` (0-based).
    ///
    /// `hint` is the server-supplied wait; when present and non-zero it is
    /// returned verbatim and `rng` is not touched.
    #[must_use]
    pub fn compute<R: Rng + ?Sized>(
        &self,
        attempt: u32,
        hint: Option<Duration>,
        rng: &mut R,
    ) -> Duration {
        if let Some(hint) = hint.filter(|h| !h.is_zero()) {
            return hint;
        }

        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        let wait = self.base.saturating_mul(factor).min(self.cap);

        let quarter = u64::try_from((wait / 4).as_nanos()).unwrap_or(u64::MAX);
        if quarter == 0 {
            return wait;
        }
        wait + Duration::from_nanos(rng.random_range(0..quarter))
    }
}

/// Per-client random source for jitter.
///
/// Owned by exactly one client; never shared across instances.
#[derive(Debug)]
pub struct Jitter(Mutex<StdRng>);

impl Jitter {
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self(Mutex::new(StdRng::seed_from_u64(seed)))
    }

    #[must_use]
    pub fn from_entropy() -> Self {
        Self(Mutex::new(StdRng::from_os_rng()))
    }

    pub fn wait(
        &self,
        policy: &BackoffPolicy,
        attempt: u32,
        hint: Option<Duration>,
    ) -> Duration {
        let mut rng = self.0.lock();
        policy.compute(attempt, hint, &mut *rng)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_wait_within_jitter_band() {
        let policy = BackoffPolicy::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            for attempt in 0..policy.max_attempts {
                let floor = Duration::from_secs(1 << attempt);
                let wait = policy.compute(attempt, None, &mut rng);
                assert!(wait >= floor, "attempt {attempt}: {wait:?} < {floor:?}");
                assert!(
                    wait < floor.mul_f64(1.25),
                    "attempt {attempt}: {wait:?} above jitter band"
                );
            }
        }
    }

    #[test]
    fn test_wait_capped_before_jitter() {
        let policy = BackoffPolicy::default();
        let mut rng = StdRng::seed_from_u64(11);

        for attempt in [5, 10, 31, 32, 1000] {
            let wait = policy.compute(attempt, None, &mut rng);
            assert!(wait >= Duration::from_secs(30));
            assert!(wait < Duration::from_millis(37_500));
        }
    }

    #[test]
    fn test_server_hint_is_verbatim() {
        let policy = BackoffPolicy::default();
        let mut rng = StdRng::seed_from_u64(3);
        let hint = Duration::from_secs(42);

        for attempt in 0..5 {
            assert_eq!(policy.compute(attempt, Some(hint), &mut rng), hint);
        }
    }

    #[test]
    fn test_zero_hint_falls_back_to_policy() {
        let policy = BackoffPolicy::default();
        let mut rng = StdRng::seed_from_u64(3);
        let wait = policy.compute(0, Some(Duration::ZERO), &mut rng);
        assert!(wait >= Duration::from_secs(1));
    }

    #[test]
    fn test_zero_base_has_no_jitter() {
        let policy = BackoffPolicy {
            base: Duration::ZERO,
            ..BackoffPolicy::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(policy.compute(2, None, &mut rng), Duration::ZERO);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let policy = BackoffPolicy::default();
        let a = Jitter::from_seed(99);
        let b = Jitter::from_seed(99);

        for attempt in 0..3 {
            assert_eq!(
                a.wait(&policy, attempt, None),
                b.wait(&policy, attempt, None)
            );
        }
    }
}
