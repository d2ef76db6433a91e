//! Error taxonomy for the engine
//!
//! Every failure is a local, synchronous failure of a single call; there is
//! no cross-call recovery state. Callers get a descriptive condition rather
//! than a degraded or partially-computed result.

use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
  /// No `CycleConfig` exists, or tracking is disabled for the user.
  /// The caller is expected to prompt onboarding, not retry.
  #[error("Cycle tracking is not configured for this user")]
  ConfigurationMissing,

  /// Prediction requested with zero cycles recorded.
  #[error("No cycle history recorded - insufficient data for prediction")]
  NoHistory,

  /// Caller-supplied value outside its allowed domain. Rejected before any
  /// computation, never silently clamped.
  #[error("Value out of range: {0}")]
  InvalidRange(String),

  /// A date handed to the phase calculator precedes the cycle start.
  #[error("Date {date} precedes cycle start {cycle_start}")]
  InvalidDate {
    date: NaiveDate,
    cycle_start: NaiveDate,
  },

  /// The exercise catalog query failed or produced nothing usable.
  /// An explicit failure is preferable to a misleadingly short session.
  #[error("Exercise catalog unavailable: {0}")]
  CatalogUnavailable(String),

  #[error("Storage error: {0}")]
  Storage(#[from] sqlx::Error),

  /// A stored record failed to decode (e.g. unknown enum label).
  #[error("Corrupt record: {0}")]
  Decode(String),
}

// Serialize as the display string so the error crosses the facade boundary
// as a plain message.
impl serde::Serialize for CoreError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}
