//! Thin request facade over the engine
//!
//! These are the capabilities a request handler consumes. Each call is
//! independent: gate on config, fetch history through the store seam, run
//! the pure engine, return. Dates are passed in by the caller so behavior
//! stays deterministic under test.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::calendar::{build_calendar, CalendarDay};
use crate::error::CoreError;
use crate::models::{CycleConfig, MuscleZone};
use crate::phases::{self, Phase, PhaseSnapshot};
use crate::prediction::{predict, Prediction};
use crate::program::{self, GeneratedProgram, ProgramRequest, SessionType};
use crate::store::{CycleStore, ExerciseCatalog};

/// Months of calendar returned when the caller does not say.
pub const DEFAULT_MONTH_COUNT: u32 = 3;

/// Allowed calendar span in months.
pub const MONTH_COUNT_RANGE: std::ops::RangeInclusive<u32> = 1..=12;

/// Session duration assumed when the caller does not say, minutes.
pub const DEFAULT_DURATION_MINUTES: i64 = 30;

/// ---------------------------------------------------------------------------
/// Phase status
/// ---------------------------------------------------------------------------

/// Current phase for a user on `on_date`, framed by their most recent
/// recorded cycle.
pub async fn phase_status<S: CycleStore>(
  store: &S,
  user_id: &str,
  on_date: NaiveDate,
) -> Result<PhaseSnapshot, CoreError> {
  require_tracking(store, user_id).await?;

  let cycles = store.list_cycles(user_id).await?;
  let cycle = cycles
    .iter()
    .find(|c| c.start_date <= on_date)
    .ok_or(CoreError::NoHistory)?;

  phases::current_phase(cycle, on_date)
}

/// ---------------------------------------------------------------------------
/// Prediction
/// ---------------------------------------------------------------------------

/// Forecast for a user as of `as_of`. Requires at least one recorded cycle.
pub async fn predict_for_user<S: CycleStore>(
  store: &S,
  user_id: &str,
  as_of: NaiveDate,
) -> Result<Prediction, CoreError> {
  let config = require_tracking(store, user_id).await?;
  if config.menopause_mode {
    // Forecasting is switched off entirely in menopause mode
    return Err(CoreError::ConfigurationMissing);
  }

  let cycles = store.list_cycles(user_id).await?;
  let prediction = predict(&cycles, as_of)?;
  info!(user_id, confidence = prediction.confidence, "prediction served");
  Ok(prediction)
}

/// ---------------------------------------------------------------------------
/// Calendar
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarView {
  pub calendar: Vec<CalendarDay>,
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
}

/// Multi-month calendar blending confirmed history with the prediction
/// overlay. `start` defaults to today's month, `month_count` to three.
pub async fn calendar_for_user<S: CycleStore>(
  store: &S,
  user_id: &str,
  start: Option<NaiveDate>,
  month_count: Option<u32>,
  today: NaiveDate,
) -> Result<CalendarView, CoreError> {
  let config = require_tracking(store, user_id).await?;

  let month_count = month_count.unwrap_or(DEFAULT_MONTH_COUNT);
  if !MONTH_COUNT_RANGE.contains(&month_count) {
    return Err(CoreError::InvalidRange(format!(
      "month_count {} not in {}..={}",
      month_count,
      MONTH_COUNT_RANGE.start(),
      MONTH_COUNT_RANGE.end(),
    )));
  }

  let cycles = store.list_cycles(user_id).await?;

  // No history simply means no overlay; the calendar itself still renders.
  let prediction = if config.menopause_mode {
    None
  } else {
    match predict(&cycles, today) {
      Ok(p) => Some(p),
      Err(CoreError::NoHistory) => None,
      Err(e) => return Err(e),
    }
  };

  let calendar = build_calendar(
    &cycles,
    prediction.as_ref(),
    start.unwrap_or(today),
    month_count,
  );

  let start_date = calendar.first().map(|d| d.date).unwrap_or(today);
  let end_date = calendar.last().map(|d| d.date).unwrap_or(today);
  Ok(CalendarView {
    calendar,
    start_date,
    end_date,
  })
}

/// ---------------------------------------------------------------------------
/// Program generation
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramOptions {
  pub duration_minutes: Option<i64>,
  pub session_type: Option<SessionType>,
  pub focus_zone: Option<MuscleZone>,
}

/// Generate a session for an explicitly supplied phase.
pub async fn generate_program<C: ExerciseCatalog>(
  catalog: &C,
  phase: Phase,
  options: &ProgramOptions,
) -> Result<GeneratedProgram, CoreError> {
  let request = ProgramRequest {
    phase,
    target_duration_minutes: options.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
    session_type: options.session_type.unwrap_or(SessionType::Mixed),
    focus_zone: options.focus_zone,
  };
  program::generate(catalog, &request).await
}

/// Generate a session for the phase the user is in today.
pub async fn program_for_today<S, C>(
  store: &S,
  catalog: &C,
  user_id: &str,
  today: NaiveDate,
  options: &ProgramOptions,
) -> Result<GeneratedProgram, CoreError>
where
  S: CycleStore,
  C: ExerciseCatalog,
{
  let snapshot = phase_status(store, user_id, today).await?;
  info!(user_id, phase = %snapshot.phase, "generating phase-adapted session");
  generate_program(catalog, snapshot.phase, options).await
}

/// ---------------------------------------------------------------------------
/// Config gate
/// ---------------------------------------------------------------------------

/// Phase, prediction, and calendar data require a config with tracking on.
async fn require_tracking<S: CycleStore>(
  store: &S,
  user_id: &str,
) -> Result<CycleConfig, CoreError> {
  match store.get_config(user_id).await? {
    Some(config) if config.tracking_enabled => Ok(config),
    _ => Err(CoreError::ConfigurationMissing),
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::calendar::DayType;
  use crate::models::Intensity;
  use crate::test_utils::{
    date, new_cycle, seed_regular_history, seed_test_exercises, setup_test_store,
  };

  #[tokio::test]
  async fn test_missing_config_blocks_phase_data() {
    let store = setup_test_store().await;

    let result = phase_status(&store, "u1", date(2024, 6, 1)).await;
    assert!(matches!(result, Err(CoreError::ConfigurationMissing)));

    let result = predict_for_user(&store, "u1", date(2024, 6, 1)).await;
    assert!(matches!(result, Err(CoreError::ConfigurationMissing)));

    let result = calendar_for_user(&store, "u1", None, None, date(2024, 6, 1)).await;
    assert!(matches!(result, Err(CoreError::ConfigurationMissing)));
  }

  #[tokio::test]
  async fn test_disabled_tracking_blocks_phase_data() {
    let store = setup_test_store().await;
    let mut config = CycleConfig::default();
    config.tracking_enabled = false;
    store.upsert_config("u1", &config).await.unwrap();

    let result = phase_status(&store, "u1", date(2024, 6, 1)).await;
    assert!(matches!(result, Err(CoreError::ConfigurationMissing)));
  }

  #[tokio::test]
  async fn test_phase_status_uses_most_recent_cycle() {
    let store = setup_test_store().await;
    store.ensure_config("u1").await.unwrap();
    store
      .log_cycle(&new_cycle("u1", date(2024, 4, 1)), date(2024, 4, 1))
      .await
      .unwrap();
    store
      .log_cycle(&new_cycle("u1", date(2024, 5, 1)), date(2024, 5, 1))
      .await
      .unwrap();

    let snap = phase_status(&store, "u1", date(2024, 5, 3)).await.unwrap();
    assert_eq!(snap.cycle_day, 3);
    assert_eq!(snap.phase, Phase::Menstrual);
  }

  #[tokio::test]
  async fn test_phase_status_without_history() {
    let store = setup_test_store().await;
    store.ensure_config("u1").await.unwrap();

    let result = phase_status(&store, "u1", date(2024, 6, 1)).await;
    assert!(matches!(result, Err(CoreError::NoHistory)));
  }

  #[tokio::test]
  async fn test_prediction_end_to_end() {
    let store = setup_test_store().await;
    store.ensure_config("u1").await.unwrap();
    seed_regular_history(&store, "u1", date(2024, 4, 2), 4).await;

    let p = predict_for_user(&store, "u1", date(2024, 4, 10)).await.unwrap();
    assert_eq!(p.next_period_start, date(2024, 4, 30));
    assert!((10..=95).contains(&p.confidence));
  }

  #[tokio::test]
  async fn test_menopause_mode_disables_prediction() {
    let store = setup_test_store().await;
    let mut config = CycleConfig::default();
    config.menopause_mode = true;
    store.upsert_config("u1", &config).await.unwrap();
    store
      .log_cycle(&new_cycle("u1", date(2024, 5, 1)), date(2024, 5, 1))
      .await
      .unwrap();

    let result = predict_for_user(&store, "u1", date(2024, 5, 10)).await;
    assert!(matches!(result, Err(CoreError::ConfigurationMissing)));

    // The calendar still renders, just without the prediction overlay
    let view = calendar_for_user(&store, "u1", None, Some(2), date(2024, 5, 10))
      .await
      .unwrap();
    assert!(view.calendar.iter().all(|d| !d.is_predicted));
  }

  #[tokio::test]
  async fn test_calendar_view_bounds_and_defaults() {
    let store = setup_test_store().await;
    store.ensure_config("u1").await.unwrap();
    store
      .log_cycle(&new_cycle("u1", date(2024, 5, 1)), date(2024, 5, 1))
      .await
      .unwrap();

    let view = calendar_for_user(&store, "u1", None, None, date(2024, 5, 10))
      .await
      .unwrap();
    // Default three whole months starting with today's month
    assert_eq!(view.start_date, date(2024, 5, 1));
    assert_eq!(view.end_date, date(2024, 7, 31));
    assert_eq!(view.calendar.len(), 92);

    // Confirmed period start present, predicted period further out
    assert!(view
      .calendar
      .iter()
      .any(|d| d.day_type == DayType::PeriodStart && !d.is_predicted));
    assert!(view
      .calendar
      .iter()
      .any(|d| d.day_type == DayType::PredictedPeriod && d.is_predicted));
  }

  #[tokio::test]
  async fn test_calendar_month_count_validated() {
    let store = setup_test_store().await;
    store.ensure_config("u1").await.unwrap();

    for bad in [0u32, 13, 24] {
      let result =
        calendar_for_user(&store, "u1", None, Some(bad), date(2024, 5, 10)).await;
      assert!(
        matches!(result, Err(CoreError::InvalidRange(_))),
        "month_count {} accepted",
        bad
      );
    }
  }

  #[tokio::test]
  async fn test_program_for_today_end_to_end() {
    let store = setup_test_store().await;
    store.ensure_config("u1").await.unwrap();
    seed_test_exercises(&store).await;
    store
      .log_cycle(&new_cycle("u1", date(2024, 5, 1)), date(2024, 5, 1))
      .await
      .unwrap();

    // Day 2: menstrual phase, so the session is built from very light work
    let options = ProgramOptions {
      duration_minutes: Some(20),
      session_type: Some(SessionType::Flexibility),
      focus_zone: None,
    };
    let program = program_for_today(&store, &store, "u1", date(2024, 5, 2), &options)
      .await
      .unwrap();

    assert_eq!(program.phase, Phase::Menstrual);
    assert!(program.total_duration_minutes <= 20);
    assert!(program
      .exercises
      .iter()
      .all(|p| p.exercise.intensity == Intensity::VeryLow));
  }

  #[tokio::test]
  async fn test_generate_program_defaults() {
    let store = setup_test_store().await;
    seed_test_exercises(&store).await;

    let program = generate_program(&store, Phase::Luteal, &ProgramOptions::default())
      .await
      .unwrap();
    assert_eq!(program.session_type, SessionType::Mixed);
    assert!(program.total_duration_minutes <= 30);
    assert!(program.title.contains("30 min"));
  }
}
