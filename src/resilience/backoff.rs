//! Exponential backoff.

use std::time::Duration;

/// Delay before retry number `retry_index` (0 for the first retry): `base × 2^retry_index`.
///
/// No jitter is applied, so concurrent clients retry in lockstep.
pub fn calculate_backoff(retry_index: u32, base: Duration) -> Duration {
    let multiplier = 2u32.saturating_pow(retry_index);
    base.saturating_mul(multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let base = Duration::from_millis(100);
        assert_eq!(calculate_backoff(0, base), Duration::from_millis(100));
        assert_eq!(calculate_backoff(1, base), Duration::from_millis(200));
        assert_eq!(calculate_backoff(2, base), Duration::from_millis(400));
        assert_eq!(calculate_backoff(5, base), Duration::from_millis(3200));
    }

    #[test]
    fn test_backoff_saturates() {
        let delay = calculate_backoff(64, Duration::from_secs(1));
        assert!(delay >= Duration::from_secs(u32::MAX as u64));
    }
}
