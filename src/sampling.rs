//! Candidate frame placement within an interval.
//!
//! A [`CandidatePolicy`] decides which frame index each attempt in an
//! interval reads. Both policies are deterministic, keep every candidate
//! inside its interval, and never revisit an index: the attempt count is
//! capped at the interval width.

/// How attempts are spread across an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CandidatePolicy {
    /// Spread attempts evenly across the interval, starting at its first
    /// frame. With 5 attempts in a 100-frame interval the offsets are
    /// `0, 20, 40, 60, 80`. This is the default.
    #[default]
    EvenlySpaced,
    /// Read the first frames of the interval in order: offsets `0, 1, 2, …`.
    ///
    /// The samples are close together in time, so a blurry stretch at the
    /// start of an interval tends to use up every attempt.
    Consecutive,
}

impl CandidatePolicy {
    /// Number of attempts that will actually be made in an interval of
    /// `interval_size` frames with a budget of `max_attempts`.
    pub fn attempts(self, interval_size: u64, max_attempts: usize) -> usize {
        (max_attempts as u64).min(interval_size) as usize
    }

    /// Offset from the interval start for `attempt` (0-based) when
    /// `attempts` attempts are being made in total.
    ///
    /// `attempt` must be less than `attempts`, and `attempts` must not exceed
    /// `interval_size`.
    pub fn offset(self, attempt: usize, attempts: usize, interval_size: u64) -> u64 {
        match self {
            CandidatePolicy::EvenlySpaced => {
                if attempts == 0 {
                    return 0;
                }
                (attempt as u128 * interval_size as u128 / attempts as u128) as u64
            }
            CandidatePolicy::Consecutive => attempt as u64,
        }
    }

    /// All candidate frame indices for an interval, in attempt order.
    pub fn candidates(self, start: u64, interval_size: u64, max_attempts: usize) -> Vec<u64> {
        let attempts = self.attempts(interval_size, max_attempts);
        (0..attempts)
            .map(|attempt| start + self.offset(attempt, attempts, interval_size))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evenly_spaced_offsets() {
        let indices = CandidatePolicy::EvenlySpaced.candidates(100, 100, 5);
        assert_eq!(indices, vec![100, 120, 140, 160, 180]);
    }

    #[test]
    fn evenly_spaced_first_candidate_is_interval_start() {
        for start in [0, 10, 90] {
            let indices = CandidatePolicy::EvenlySpaced.candidates(start, 10, 5);
            assert_eq!(indices[0], start);
        }
    }

    #[test]
    fn consecutive_offsets() {
        let indices = CandidatePolicy::Consecutive.candidates(30, 10, 3);
        assert_eq!(indices, vec![30, 31, 32]);
    }

    #[test]
    fn attempts_capped_by_interval_width() {
        let indices = CandidatePolicy::EvenlySpaced.candidates(6, 3, 5);
        assert_eq!(indices, vec![6, 7, 8]);
        assert_eq!(CandidatePolicy::Consecutive.attempts(2, 5), 2);
    }

    #[test]
    fn candidates_are_distinct_and_inside_interval() {
        for policy in [CandidatePolicy::EvenlySpaced, CandidatePolicy::Consecutive] {
            for size in 1..40u64 {
                for budget in 1..8usize {
                    let indices = policy.candidates(1000, size, budget);
                    let mut deduped = indices.clone();
                    deduped.dedup();
                    assert_eq!(indices, deduped, "{policy:?} size={size} budget={budget}");
                    assert!(indices.iter().all(|&i| (1000..1000 + size).contains(&i)));
                    assert!(indices.windows(2).all(|w| w[0] < w[1]));
                }
            }
        }
    }

    #[test]
    fn single_attempt_reads_interval_start() {
        assert_eq!(CandidatePolicy::EvenlySpaced.candidates(40, 10, 1), vec![40]);
    }

    #[test]
    fn huge_interval_does_not_overflow() {
        let size = u64::MAX / 2;
        let indices = CandidatePolicy::EvenlySpaced.candidates(0, size, 5);
        assert_eq!(indices.len(), 5);
        assert_eq!(indices[0], 0);
        assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(indices.iter().all(|&index| index < size));
    }
}
