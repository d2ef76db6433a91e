use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::CoreError;

/// One recorded menstrual cycle. Identity is immutable; the length fields
/// may be filled in later as more data arrives (e.g. an end date is logged).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cycle {
  pub id: i64,
  pub user_id: String,
  /// Never in the future relative to creation time.
  pub start_date: NaiveDate,
  pub cycle_length: Option<i64>,
  pub period_length: Option<i64>,
  pub is_regular: bool,
  pub created_at: Option<DateTime<Utc>>,
}

impl Cycle {
  /// Recorded cycle length, or the 28-day policy default.
  pub fn effective_cycle_length(&self) -> i64 {
    defaults::effective_cycle_length(self.cycle_length)
  }

  /// Recorded period length, or the 5-day policy default.
  pub fn effective_period_length(&self) -> i64 {
    defaults::effective_period_length(self.period_length)
  }

  /// Whether `date` falls inside this cycle's window `[start, start+len)`.
  pub fn contains(&self, date: NaiveDate) -> bool {
    let days = (date - self.start_date).num_days();
    days >= 0 && days < self.effective_cycle_length()
  }
}

/// Insert shape for a newly logged period start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCycle {
  pub user_id: String,
  pub start_date: NaiveDate,
  pub cycle_length: Option<i64>,
  pub period_length: Option<i64>,
  #[serde(default = "default_true")]
  pub is_regular: bool,
}

fn default_true() -> bool {
  true
}

/// Per-user tracking settings. One per user, created lazily on the first
/// cycle-related interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleConfig {
  pub tracking_enabled: bool,
  pub uses_external_provider: bool,
  pub menopause_mode: bool,
  pub average_cycle_length: i64,
  pub average_period_length: i64,
  pub prefers_manual_input: bool,
}

impl Default for CycleConfig {
  fn default() -> Self {
    Self {
      tracking_enabled: true,
      uses_external_provider: false,
      menopause_mode: false,
      average_cycle_length: defaults::DEFAULT_CYCLE_LENGTH,
      average_period_length: defaults::DEFAULT_PERIOD_LENGTH,
      prefers_manual_input: true,
    }
  }
}

impl CycleConfig {
  /// Reject out-of-domain settings before they reach storage.
  pub fn validate(&self) -> Result<(), CoreError> {
    if !defaults::CYCLE_LENGTH_RANGE.contains(&self.average_cycle_length) {
      return Err(CoreError::InvalidRange(format!(
        "average_cycle_length {} not in {}..={}",
        self.average_cycle_length,
        defaults::CYCLE_LENGTH_RANGE.start(),
        defaults::CYCLE_LENGTH_RANGE.end(),
      )));
    }
    if !defaults::PERIOD_LENGTH_RANGE.contains(&self.average_period_length) {
      return Err(CoreError::InvalidRange(format!(
        "average_period_length {} not in {}..={}",
        self.average_period_length,
        defaults::PERIOD_LENGTH_RANGE.start(),
        defaults::PERIOD_LENGTH_RANGE.end(),
      )));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn cycle(start: NaiveDate, len: Option<i64>) -> Cycle {
    Cycle {
      id: 1,
      user_id: "u1".into(),
      start_date: start,
      cycle_length: len,
      period_length: None,
      is_regular: true,
      created_at: None,
    }
  }

  #[test]
  fn test_contains_is_half_open() {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let c = cycle(start, Some(28));

    assert!(c.contains(start));
    assert!(c.contains(start + chrono::Duration::days(27)));
    assert!(!c.contains(start + chrono::Duration::days(28)));
    assert!(!c.contains(start - chrono::Duration::days(1)));
  }

  #[test]
  fn test_effective_lengths_use_defaults() {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let c = cycle(start, None);
    assert_eq!(c.effective_cycle_length(), 28);
    assert_eq!(c.effective_period_length(), 5);
  }

  #[test]
  fn test_config_validation_bounds() {
    let mut config = CycleConfig::default();
    assert!(config.validate().is_ok());

    config.average_cycle_length = 20;
    assert!(matches!(
      config.validate(),
      Err(CoreError::InvalidRange(_))
    ));

    config.average_cycle_length = 40;
    config.average_period_length = 11;
    assert!(matches!(
      config.validate(),
      Err(CoreError::InvalidRange(_))
    ));
  }
}
