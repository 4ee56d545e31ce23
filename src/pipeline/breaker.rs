//! Per-provider circuit breaker. Consecutive non-ok outcomes open the
//! circuit for a cool-down window during which the provider is skipped
//! without being invoked; a single ok outcome closes it again.
//!
//! Constructed explicitly with injected clock and thresholds so tests can
//! drive time; state lives for the process, nothing is persisted.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Injected time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct CircuitState {
    failures: u32,
    open_until: Option<Instant>,
}

pub struct CircuitBreaker {
    states: DashMap<String, CircuitState>,
    threshold: u32,
    cooldown: Duration,
    clock: Arc<dyn Clock>,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, cooldown: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            states: DashMap::new(),
            threshold,
            cooldown,
            clock,
        }
    }

    /// Whether calls to this provider should currently be skipped.
    pub fn is_open(&self, provider: &str) -> bool {
        match self.states.get(provider) {
            Some(state) => matches!(state.open_until, Some(until) if until > self.clock.now()),
            None => false,
        }
    }

    /// Count a non-ok outcome; opens (or re-extends) the circuit once the
    /// consecutive-failure threshold is reached.
    pub fn record_failure(&self, provider: &str) {
        let now = self.clock.now();
        let mut entry = self.states.entry(provider.to_string()).or_default();
        entry.failures += 1;
        if entry.failures >= self.threshold {
            entry.open_until = Some(now + self.cooldown);
        }
    }

    /// An ok outcome resets the counter and closes the circuit immediately.
    pub fn record_success(&self, provider: &str) {
        self.states
            .insert(provider.to_string(), CircuitState::default());
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Clock;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    /// Manually advanced clock for breaker/cache tests.
    pub struct ManualClock {
        now: Mutex<Instant>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                now: Mutex::new(Instant::now()),
            }
        }

        pub fn advance(&self, delta: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += delta;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ManualClock;
    use super::*;

    fn breaker(clock: Arc<ManualClock>) -> CircuitBreaker {
        CircuitBreaker::new(3, Duration::from_secs(30), clock)
    }

    #[test]
    fn test_opens_after_threshold() {
        let clock = Arc::new(ManualClock::new());
        let breaker = breaker(Arc::clone(&clock));

        breaker.record_failure("svc");
        breaker.record_failure("svc");
        assert!(!breaker.is_open("svc"));
        breaker.record_failure("svc");
        assert!(breaker.is_open("svc"));
    }

    #[test]
    fn test_cooldown_expires() {
        let clock = Arc::new(ManualClock::new());
        let breaker = breaker(Arc::clone(&clock));

        for _ in 0..3 {
            breaker.record_failure("svc");
        }
        assert!(breaker.is_open("svc"));
        clock.advance(Duration::from_secs(31));
        assert!(!breaker.is_open("svc"));
    }

    #[test]
    fn test_success_resets_immediately() {
        let clock = Arc::new(ManualClock::new());
        let breaker = breaker(Arc::clone(&clock));

        for _ in 0..3 {
            breaker.record_failure("svc");
        }
        breaker.record_success("svc");
        assert!(!breaker.is_open("svc"));
        // Counter restarted: two more failures do not reopen.
        breaker.record_failure("svc");
        breaker.record_failure("svc");
        assert!(!breaker.is_open("svc"));
    }

    #[test]
    fn test_providers_are_independent() {
        let clock = Arc::new(ManualClock::new());
        let breaker = breaker(Arc::clone(&clock));

        for _ in 0..3 {
            breaker.record_failure("a");
        }
        assert!(breaker.is_open("a"));
        assert!(!breaker.is_open("b"));
    }
}
