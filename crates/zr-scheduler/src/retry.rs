//! Retry delay computation (spec §4.E step 6).

use std::time::Duration;

/// The delay before retry attempt number `attempt` (1-indexed: the delay
/// before the *first* retry, i.e. the second overall attempt, is
/// `attempt = 1`).
///
/// `retry_delay_ms`, multiplied by `2^(attempt-1)` when
/// `exponential_backoff` is set (spec §4.E step 6).
#[must_use]
pub fn delay_for_attempt(retry_delay_ms: u64, exponential_backoff: bool, attempt: u32) -> Duration {
    if retry_delay_ms == 0 {
        return Duration::ZERO;
    }
    if !exponential_backoff {
        return Duration::from_millis(retry_delay_ms);
    }
    let multiplier = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    let millis = retry_delay_ms.saturating_mul(multiplier);
    Duration::from_millis(millis)
}
