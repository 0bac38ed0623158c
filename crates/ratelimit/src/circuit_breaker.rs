use std::future::Future;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CircuitBreakerError<E> {
    #[error("Circuit breaker is open")]
    Open,
    #[error("Operation failed: {0}")]
    Operation(E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,   // Normal operation
    Open,     // Failing, reject requests
    HalfOpen, // Testing if recovered
}

impl From<u8> for CircuitState {
    fn from(value: u8) -> Self {
        match value {
            0 => CircuitState::Closed,
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }
}

impl From<CircuitState> for u8 {
    fn from(state: CircuitState) -> Self {
        match state {
            CircuitState::Closed => 0,
            CircuitState::Open => 1,
            CircuitState::HalfOpen => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub timeout_duration: Duration,
    pub half_open_requests: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            timeout_duration: Duration::from_secs(60),
            half_open_requests: 3,
        }
    }
}

pub struct CircuitBreaker {
    state: AtomicU8,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    last_failure: AtomicU64,
    half_open_attempts: AtomicU32,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            state: AtomicU8::new(CircuitState::Closed.into()),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            last_failure: AtomicU64::new(0),
            half_open_attempts: AtomicU32::new(0),
            config,
        }
    }

    pub fn state(&self) -> CircuitState {
        let state_value = self.state.load(Ordering::Relaxed);
        CircuitState::from(state_value)
    }

    fn should_attempt_reset(&self) -> bool {
        let last_failure = self.last_failure.load(Ordering::Relaxed);
        if last_failure == 0 {
            return false;
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let elapsed = now.saturating_sub(last_failure);
        elapsed >= self.config.timeout_duration.as_secs()
    }

    fn try_transition_to_half_open(&self) -> bool {
        if self.should_attempt_reset() {
            self.state
                .compare_exchange(
                    CircuitState::Open.into(),
                    CircuitState::HalfOpen.into(),
                    Ordering::SeqCst,
                    Ordering::Relaxed,
                )
                .is_ok()
        } else {
            false
        }
    }

    pub fn record_success(&self) {
        let current_state = self.state();

        match current_state {
            CircuitState::HalfOpen => {
                let successes = self.success_count.fetch_add(1, Ordering::SeqCst) + 1;
                if successes >= self.config.success_threshold {
                    // Transition to closed
                    self.state.store(CircuitState::Closed.into(), Ordering::SeqCst);
                    self.failure_count.store(0, Ordering::Relaxed);
                    self.success_count.store(0, Ordering::Relaxed);
                    self.half_open_attempts.store(0, Ordering::Relaxed);
                    tracing::info!("Circuit breaker transitioned to CLOSED");
                }
            }
            CircuitState::Closed => {
                // Reset failure count on success
                self.failure_count.store(0, Ordering::Relaxed);
            }
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        let current_state = self.state();

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        self.last_failure.store(now, Ordering::Relaxed);

        match current_state {
            CircuitState::Closed => {
                let failures = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
                if failures >= self.config.failure_threshold {
                    // Transition to open
                    self.state.store(CircuitState::Open.into(), Ordering::SeqCst);
                    self.success_count.store(0, Ordering::Relaxed);
                    tracing::warn!("Circuit breaker transitioned to OPEN after {} failures", failures);
                }
            }
            CircuitState::HalfOpen => {
                // Any failure in half-open goes back to open
                self.state.store(CircuitState::Open.into(), Ordering::SeqCst);
                self.success_count.store(0, Ordering::Relaxed);
                self.half_open_attempts.store(0, Ordering::Relaxed);
                tracing::warn!("Circuit breaker transitioned back to OPEN from HALF_OPEN");
            }
            CircuitState::Open => {}
        }
    }

    pub fn call<F, T, E>(&self, f: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let current_state = self.state();

        match current_state {
            CircuitState::Closed => {
                match f() {
                    Ok(result) => {
                        self.record_success();
                        Ok(result)
                    }
                    Err(e) => {
                        self.record_failure();
                        Err(CircuitBreakerError::Operation(e))
                    }
                }
            }
            CircuitState::Open => {
                if self.try_transition_to_half_open() {
                    // Successfully transitioned to half-open, try the operation
                    match f() {
                        Ok(result) => {
                            self.record_success();
                            Ok(result)
                        }
                        Err(e) => {
                            self.record_failure();
                            Err(CircuitBreakerError::Operation(e))
                        }
                    }
                } else {
                    Err(CircuitBreakerError::Open)
                }
            }
            CircuitState::HalfOpen => {
                let attempts = self.half_open_attempts.fetch_add(1, Ordering::SeqCst);
                if attempts < self.config.half_open_requests {
                    match f() {
                        Ok(result) => {
                            self.record_success();
                            Ok(result)
                        }
                        Err(e) => {
                            self.record_failure();
                            Err(CircuitBreakerError::Operation(e))
                        }
                    }
                } else {
                    // Too many half-open attempts
                    Err(CircuitBreakerError::Open)
                }
            }
        }
    }

    pub async fn call_async<F, Fut, T, E>(&self, f: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let current_state = self.state();

        match current_state {
            CircuitState::Closed => {
                match f().await {
                    Ok(result) => {
                        self.record_success();
                        Ok(result)
                    }
                    Err(e) => {
                        self.record_failure();
                        Err(CircuitBreakerError::Operation(e))
                    }
                }
            }
            CircuitState::Open => {
                if self.try_transition_to_half_open() {
                    // Successfully transitioned to half-open, try the operation
                    match f().await {
                        Ok(result) => {
                            self.record_success();
                            Ok(result)
                        }
                        Err(e) => {
                            self.record_failure();
                            Err(CircuitBreakerError::Operation(e))
                        }
                    }
                } else {
                    Err(CircuitBreakerError::Open)
                }
            }
            CircuitState::HalfOpen => {
                let attempts = self.half_open_attempts.fetch_add(1, Ordering::SeqCst);
                if attempts < self.config.half_open_requests {
                    match f().await {
                        Ok(result) => {
                            self.record_success();
                            Ok(result)
                        }
                        Err(e) => {
                            self.record_failure();
                            Err(CircuitBreakerError::Operation(e))
                        }
                    }
                } else {
                    // Too many half-open attempts
                    Err(CircuitBreakerError::Open)
                }
            }
        }
    }
}
