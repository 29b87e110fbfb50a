//! Retry policy for vendor calls.

use std::time::Duration;

/// How many times a vendor call is attempted and how long to wait between
/// attempts. Which failures qualify is decided by
/// [`AdapterError::is_retryable`](crate::AdapterError::is_retryable).
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. `1` disables retry.
    pub max_attempts: u32,

    /// Delay before the second attempt.
    pub base_delay: Duration,

    /// Backoff multiplier applied per further attempt.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single_attempt()
    }
}

impl RetryPolicy {
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_secs(2),
            multiplier: 2.0,
        }
    }

    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            multiplier: 2.0,
        }
    }

    /// Whether another attempt may follow attempt number `attempt` (1-indexed).
    pub fn allows_another(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay after failed attempt number `attempt` (1-indexed):
    /// `base_delay * multiplier^(attempt - 1)`.
    pub fn next_delay(&self, attempt: u32) -> Duration {
        let base_secs = self.base_delay.as_secs_f64();
        let delay_secs = base_secs * self.multiplier.powi(attempt.saturating_sub(1) as i32);
        Duration::from_secs_f64(delay_secs)
    }

    /// Longest a call sequence can take when every attempt runs for
    /// `per_attempt` and then fails retryably.
    pub fn worst_case(&self, per_attempt: Duration) -> Duration {
        let backoff: Duration = (1..self.max_attempts).map(|a| self.next_delay(a)).sum();
        per_attempt * self.max_attempts + backoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_never_retries() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 1);
        assert!(!policy.allows_another(1));
    }

    #[test]
    fn zero_attempts_is_clamped() {
        assert_eq!(RetryPolicy::new(0, Duration::from_millis(5)).max_attempts, 1);
    }

    #[test]
    fn exponential_backoff_increases() {
        let policy = RetryPolicy::new(5, Duration::from_secs(2));
        assert_eq!(policy.next_delay(1), Duration::from_secs(2));
        assert_eq!(policy.next_delay(2), Duration::from_secs(4));
        assert_eq!(policy.next_delay(3), Duration::from_secs(8));
        assert!(policy.allows_another(4));
        assert!(!policy.allows_another(5));
    }

    #[test]
    fn worst_case_adds_attempts_and_backoff() {
        let policy = RetryPolicy::new(3, Duration::from_secs(2));
        // 10 + 2 + 10 + 4 + 10
        assert_eq!(policy.worst_case(Duration::from_secs(10)), Duration::from_secs(36));
        assert_eq!(
            RetryPolicy::default().worst_case(Duration::from_secs(10)),
            Duration::from_secs(10)
        );
    }
}
