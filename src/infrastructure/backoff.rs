use std::time::Duration;

/// Exponential reconnect backoff: `base * 2^attempts`, capped at `max_attempts`.
#[derive(Debug, Clone)]
pub struct Backoff {
    attempts: u32,
    base: Duration,
    max_attempts: u32,
}

impl Backoff {
    pub fn new(base: Duration, max_attempts: u32) -> Self {
        Self {
            attempts: 0,
            base,
            max_attempts,
        }
    }

    /// Returns the delay for the next attempt and counts it, or `None` once
    /// every automatic attempt has been used.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }

        let factor = 2u32.saturating_pow(self.attempts);
        self.attempts += 1;
        Some(self.base.saturating_mul(factor))
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(crate::types::RECONNECT_BASE),
            crate::types::MAX_RECONNECT_ATTEMPTS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_double_until_exhausted() {
        let mut backoff = Backoff::default();
        let delays: Vec<u64> = std::iter::from_fn(|| backoff.next_delay())
            .map(|d| d.as_millis() as u64)
            .collect();

        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16000]);
        assert!(backoff.is_exhausted());
        assert_eq!(backoff.next_delay(), None);
    }

    #[test]
    fn test_reset_starts_over() {
        let mut backoff = Backoff::new(Duration::from_millis(250), 3);
        backoff.next_delay();
        backoff.next_delay();
        assert_eq!(backoff.attempts(), 2);

        backoff.reset();
        assert_eq!(backoff.attempts(), 0);
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_zero_attempts_never_schedules() {
        let mut backoff = Backoff::new(Duration::from_secs(1), 0);
        assert!(backoff.is_exhausted());
        assert_eq!(backoff.next_delay(), None);
    }
}
