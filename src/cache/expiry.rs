//! Expiry Calculator
//!
//! Resolves when freshly fetched records stop being servable.

use chrono::{DateTime, TimeDelta, Utc};

// == Effective Duration ==
/// Picks the cache duration that applies to a fetch.
///
/// When both the source definition and the model set a duration, the shorter
/// one wins.
pub fn effective_cache_for(source_cache_for: Option<u64>, model_cache_for: Option<u64>) -> Option<u64> {
    match (source_cache_for, model_cache_for) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

// == Compute Expiry ==
/// Computes the expiry timestamp for records fetched at `now`.
///
/// # Returns
/// - `None` if neither side sets a duration (never expires)
/// - `now + effective duration` otherwise, saturating at the latest
///   representable timestamp
pub fn compute_expiry(
    source_cache_for: Option<u64>,
    model_cache_for: Option<u64>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    effective_cache_for(source_cache_for, model_cache_for).map(|seconds| {
        i64::try_from(seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    })
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_duration_never_expires() {
        assert_eq!(compute_expiry(None, None, Utc::now()), None);
    }

    #[test]
    fn test_source_duration_only() {
        let now = Utc::now();
        assert_eq!(
            compute_expiry(Some(600), None, now),
            Some(now + TimeDelta::seconds(600))
        );
    }

    #[test]
    fn test_model_duration_only() {
        let now = Utc::now();
        assert_eq!(
            compute_expiry(None, Some(900), now),
            Some(now + TimeDelta::seconds(900))
        );
    }

    #[test]
    fn test_shorter_duration_wins() {
        let now = Utc::now();
        assert_eq!(
            compute_expiry(Some(600), Some(900), now),
            Some(now + TimeDelta::seconds(600))
        );
        assert_eq!(
            compute_expiry(Some(900), Some(600), now),
            Some(now + TimeDelta::seconds(600))
        );
    }

    #[test]
    fn test_huge_duration_saturates() {
        let now = Utc::now();
        assert_eq!(
            compute_expiry(Some(u64::MAX), None, now),
            Some(DateTime::<Utc>::MAX_UTC)
        );
    }
}
