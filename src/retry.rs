//! Bounded retry for remote store calls.
//!
//! The policy is a pure decision function: given the attempt number that
//! just failed and the class of the failure, it answers whether to try
//! again and how long to wait first. [`run`] drives an operation through
//! the policy and is the only place that sleeps.
//!
//! # Classification
//!
//! | Class | Decision |
//! |-------|----------|
//! | `Auth` (HTTP 401) | abort immediately |
//! | `Malformed` (undecodable content) | abort immediately |
//! | `Conflict` (stale revision token) | retry while attempts remain |
//! | `Transient` (network, rate limit, 5xx, missing file) | retry while attempts remain |
//!
//! The delay between attempts is fixed; there is no exponential backoff.

use std::time::Duration;

/// How a remote failure should be treated by the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Auth,
    Malformed,
    Conflict,
    Transient,
}

impl ErrorClass {
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorClass::Conflict | ErrorClass::Transient)
    }
}

/// Outcome of [`RetryPolicy::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait for the given duration, then make another attempt.
    RetryAfter(Duration),
    /// The failure class is not retryable.
    Abort,
    /// Every allowed attempt has been used.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy allowing `max_attempts` calls in total (at least one).
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Decide what follows a failure of `attempt` (1-based).
    pub fn decide(&self, attempt: u32, class: ErrorClass) -> RetryDecision {
        if !class.is_retryable() {
            RetryDecision::Abort
        } else if attempt >= self.max_attempts {
            RetryDecision::Exhausted
        } else {
            RetryDecision::RetryAfter(self.delay)
        }
    }
}

/// Implemented by errors that the retry loop can classify.
pub trait Classify {
    fn class(&self) -> ErrorClass;
}

/// The last error seen by [`run`] and how many attempts were made.
#[derive(Debug)]
pub struct RetryFailure<E> {
    pub error: E,
    pub attempts: u32,
    pub decision: RetryDecision,
}

/// Call `op` until it succeeds or the policy gives up.
///
/// `op` receives the 1-based attempt number.
pub fn run<T, E, F>(policy: &RetryPolicy, mut op: F) -> Result<T, RetryFailure<E>>
where
    E: Classify + std::fmt::Display,
    F: FnMut(u32) -> Result<T, E>,
{
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(error) => match policy.decide(attempt, error.class()) {
                RetryDecision::RetryAfter(delay) => {
                    tracing::debug!(
                        attempt,
                        max_attempts = policy.max_attempts,
                        error = %error,
                        "remote call failed; retrying"
                    );
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                }
                decision => {
                    return Err(RetryFailure {
                        error,
                        attempts: attempt,
                        decision,
                    })
                }
            },
        }
    }
}
