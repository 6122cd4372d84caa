//! Retry policies for flood-wait errors.

use std::num::NonZeroU32;
use std::ops::ControlFlow;
use std::time::Duration;

use crate::errors::InvocationError;

/// Controls how a session reacts when an RPC call fails.
pub trait RetryPolicy: Send + Sync + 'static {
    fn should_retry(&self, ctx: &RetryContext) -> ControlFlow<(), Duration>;
}

/// Context passed to [`RetryPolicy::should_retry`] on each failure.
pub struct RetryContext {
    pub fail_count:      NonZeroU32,
    pub slept_so_far:    Duration,
    /// Longest flood wait the caller accepts to absorb.
    pub sleep_threshold: Duration,
    pub error:           InvocationError,
}

/// Never retry.
pub struct NoRetries;

impl RetryPolicy for NoRetries {
    fn should_retry(&self, _: &RetryContext) -> ControlFlow<(), Duration> {
        ControlFlow::Break(())
    }
}

/// Sleep through a flood wait no longer than the threshold, then retry the
/// same request exactly once.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoSleep;

impl RetryPolicy for AutoSleep {
    fn should_retry(&self, ctx: &RetryContext) -> ControlFlow<(), Duration> {
        if let Some(secs) = ctx.error.flood_wait_seconds() {
            if ctx.fail_count.get() == 1 && secs <= ctx.sleep_threshold.as_secs() {
                tracing::info!("[courier] FLOOD_WAIT_{secs}: sleeping before retry");
                return ControlFlow::Continue(Duration::from_secs(secs));
            }
        }
        ControlFlow::Break(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RpcError;

    fn ctx(wait: u32, fail_count: u32) -> RetryContext {
        RetryContext {
            fail_count:      NonZeroU32::new(fail_count).unwrap(),
            slept_so_far:    Duration::ZERO,
            sleep_threshold: Duration::from_secs(10),
            error:           InvocationError::Rpc(RpcError::from_telegram(420, &format!("FLOOD_WAIT_{wait}"))),
        }
    }

    #[test]
    fn below_threshold_sleeps_once() {
        assert_eq!(AutoSleep.should_retry(&ctx(9, 1)), ControlFlow::Continue(Duration::from_secs(9)));
        assert_eq!(AutoSleep.should_retry(&ctx(10, 1)), ControlFlow::Continue(Duration::from_secs(10)));
        assert_eq!(AutoSleep.should_retry(&ctx(9, 2)), ControlFlow::Break(()));
    }

    #[test]
    fn above_threshold_surfaces() {
        assert_eq!(AutoSleep.should_retry(&ctx(11, 1)), ControlFlow::Break(()));
        assert_eq!(NoRetries.should_retry(&ctx(1, 1)), ControlFlow::Break(()));
    }

    #[test]
    fn other_errors_are_not_retried() {
        let c = RetryContext {
            fail_count:      NonZeroU32::MIN,
            slept_so_far:    Duration::ZERO,
            sleep_threshold: Duration::from_secs(10),
            error:           InvocationError::Timeout,
        };
        assert_eq!(AutoSleep.should_retry(&c), ControlFlow::Break(()));
    }
}
