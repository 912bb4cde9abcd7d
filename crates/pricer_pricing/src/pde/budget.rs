//! Step and wall-clock budgets with cooperative cancellation.
//!
//! A solve checks its budget once per time step, before assembling the next
//! system. Exceeding the budget aborts the solve with
//! [`PdeError::Cancelled`]; the partially filled results are dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::error::{CancelReason, PdeError};

/// Shared flag used to request cancellation from another thread.
///
/// # Example
///
/// ```
/// use pricer_pricing::pde::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// assert!(!token.is_cancelled());
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// New, untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every solve holding a clone of this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Limits on a single solve.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use pricer_pricing::pde::SolveBudget;
///
/// let budget = SolveBudget::unlimited()
///     .with_max_steps(500)
///     .with_max_duration(Duration::from_secs(2));
/// assert_eq!(budget.max_steps(), Some(500));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SolveBudget {
    max_steps: Option<usize>,
    max_duration: Option<Duration>,
    cancellation: CancellationToken,
}

impl SolveBudget {
    /// Budget that never stops a solve unless its token is cancelled.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Abort once this many steps have completed and more remain.
    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = Some(steps);
        self
    }

    /// Abort once this much wall-clock time has elapsed.
    pub fn with_max_duration(mut self, duration: Duration) -> Self {
        self.max_duration = Some(duration);
        self
    }

    /// Use `token` for cooperative cancellation.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Step limit, if any.
    pub fn max_steps(&self) -> Option<usize> {
        self.max_steps
    }

    /// Wall-clock limit, if any.
    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration
    }

    /// Token checked by the solve.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Check the budget before step `completed_steps` of a solve that
    /// started at `started`.
    ///
    /// # Errors
    ///
    /// `PdeError::Cancelled` naming the first limit that was hit.
    pub fn check(&self, completed_steps: usize, started: Instant) -> Result<(), PdeError> {
        let reason = if self.cancellation.is_cancelled() {
            Some(CancelReason::Requested)
        } else if self.max_steps.is_some_and(|max| completed_steps >= max) {
            Some(CancelReason::StepLimit)
        } else if self
            .max_duration
            .is_some_and(|max| started.elapsed() > max)
        {
            Some(CancelReason::Deadline)
        } else {
            None
        };
        match reason {
            Some(reason) => Err(PdeError::Cancelled {
                completed_steps,
                reason,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_never_cancels() {
        let budget = SolveBudget::unlimited();
        assert!(budget.check(1_000_000, Instant::now()).is_ok());
    }

    #[test]
    fn test_step_limit() {
        let budget = SolveBudget::unlimited().with_max_steps(3);
        let started = Instant::now();
        assert!(budget.check(2, started).is_ok());
        assert_eq!(
            budget.check(3, started),
            Err(PdeError::Cancelled {
                completed_steps: 3,
                reason: CancelReason::StepLimit
            })
        );
    }

    #[test]
    fn test_deadline() {
        let budget = SolveBudget::unlimited().with_max_duration(Duration::ZERO);
        let started = Instant::now() - Duration::from_millis(5);
        assert!(matches!(
            budget.check(0, started),
            Err(PdeError::Cancelled {
                reason: CancelReason::Deadline,
                ..
            })
        ));
    }

    #[test]
    fn test_token_takes_priority() {
        let token = CancellationToken::new();
        let budget = SolveBudget::unlimited()
            .with_max_steps(0)
            .with_cancellation(token.clone());
        token.cancel();
        assert!(matches!(
            budget.check(0, Instant::now()),
            Err(PdeError::Cancelled {
                reason: CancelReason::Requested,
                ..
            })
        ));
    }
}
