//! Policy defaults and allowed ranges for cycle arithmetic
//!
//! The 28/5 fallbacks recur across every component, so they live here and are
//! consumed by value. Missing lengths resolve through these helpers rather
//! than inline `unwrap_or` chains at call sites.

/// Assumed cycle length (days) when a record has none.
pub const DEFAULT_CYCLE_LENGTH: i64 = 28;

/// Assumed period length (days) when a record has none.
pub const DEFAULT_PERIOD_LENGTH: i64 = 5;

/// Ovulation is estimated this many days before the next period start.
pub const LUTEAL_OFFSET_DAYS: i64 = 14;

/// Allowed range for a configured average cycle length.
pub const CYCLE_LENGTH_RANGE: std::ops::RangeInclusive<i64> = 21..=40;

/// Allowed range for a configured average period length.
pub const PERIOD_LENGTH_RANGE: std::ops::RangeInclusive<i64> = 3..=10;

/// Resolve an optional recorded cycle length to an effective value.
/// Non-positive stored values read as absent so downstream arithmetic
/// always sees a usable length.
pub fn effective_cycle_length(recorded: Option<i64>) -> i64 {
  match recorded {
    Some(len) if len >= 1 => len,
    _ => DEFAULT_CYCLE_LENGTH,
  }
}

/// Resolve an optional recorded period length to an effective value.
/// Non-positive stored values read as absent.
pub fn effective_period_length(recorded: Option<i64>) -> i64 {
  match recorded {
    Some(len) if len >= 1 => len,
    _ => DEFAULT_PERIOD_LENGTH,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_effective_lengths_fall_back_to_policy_defaults() {
    assert_eq!(effective_cycle_length(None), 28);
    assert_eq!(effective_cycle_length(Some(31)), 31);
    assert_eq!(effective_period_length(None), 5);
    assert_eq!(effective_period_length(Some(4)), 4);
  }

  #[test]
  fn test_non_positive_lengths_read_as_absent() {
    assert_eq!(effective_cycle_length(Some(0)), 28);
    assert_eq!(effective_cycle_length(Some(-3)), 28);
    assert_eq!(effective_period_length(Some(0)), 5);
    assert_eq!(effective_period_length(Some(-1)), 5);
  }

  #[test]
  fn test_ranges_cover_defaults() {
    assert!(CYCLE_LENGTH_RANGE.contains(&DEFAULT_CYCLE_LENGTH));
    assert!(PERIOD_LENGTH_RANGE.contains(&DEFAULT_PERIOD_LENGTH));
  }
}
