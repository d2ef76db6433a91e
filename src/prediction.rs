//! Statistical cycle prediction from recorded history
//!
//! Rolling statistics over the most recent cycles feed a next-period /
//! ovulation forecast plus a bounded confidence score. The current phase is
//! framed with the ovulation-anchored boundary rule because it derives from
//! the statistical average, not a confirmed record.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::defaults::{DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_LENGTH, LUTEAL_OFFSET_DAYS};
use crate::error::CoreError;
use crate::models::Cycle;
use crate::phases::{Phase, PhaseBoundaryRule};

/// How many recent cycles feed the rolling statistics.
const STATS_WINDOW: usize = 6;

/// Confidence bounds and weights.
const CONFIDENCE_BASE: f64 = 50.0;
const CONFIDENCE_HISTORY_CAP: f64 = 30.0;
const CONFIDENCE_REGULARITY_WEIGHT: f64 = 20.0;
const CONFIDENCE_MIN: i64 = 10;
const CONFIDENCE_MAX: i64 = 95;

/// ---------------------------------------------------------------------------
/// Rolling statistics over recent cycles
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleStats {
  pub average_cycle_length: f64,
  pub average_period_length: f64,
  /// Population variance of the defined cycle lengths; 0 with fewer than
  /// two samples.
  pub variance: f64,
  /// Inverse-variance measure of consistency, 0-100.
  pub regularity_score: f64,
  /// Cycles considered (at most the 6 most recent).
  pub history_count: usize,
  /// Cycles with both lengths recorded and usable.
  pub complete_count: usize,
}

impl CycleStats {
  /// Compute statistics over `cycles`, which must already be sorted by
  /// start date descending. Only the most recent window is considered, and
  /// non-positive stored lengths are ignored as corrupt.
  pub fn compute(cycles: &[Cycle]) -> Self {
    let recent = &cycles[..cycles.len().min(STATS_WINDOW)];

    let cycle_lengths: Vec<f64> = recent
      .iter()
      .filter_map(|c| c.cycle_length.filter(|&l| l >= 1).map(|l| l as f64))
      .collect();
    let period_lengths: Vec<f64> = recent
      .iter()
      .filter_map(|c| c.period_length.filter(|&l| l >= 1).map(|l| l as f64))
      .collect();

    let average_cycle_length = if cycle_lengths.is_empty() {
      DEFAULT_CYCLE_LENGTH as f64
    } else {
      cycle_lengths.iter().sum::<f64>() / cycle_lengths.len() as f64
    };

    let average_period_length = if period_lengths.is_empty() {
      DEFAULT_PERIOD_LENGTH as f64
    } else {
      period_lengths.iter().sum::<f64>() / period_lengths.len() as f64
    };

    let variance = if cycle_lengths.len() < 2 {
      0.0
    } else {
      cycle_lengths
        .iter()
        .map(|l| (l - average_cycle_length).powi(2))
        .sum::<f64>()
        / cycle_lengths.len() as f64
    };

    let regularity_score = (100.0 - variance * 10.0).max(0.0);

    let complete_count = recent
      .iter()
      .filter(|c| {
        c.cycle_length.is_some_and(|l| l >= 1) && c.period_length.is_some_and(|l| l >= 1)
      })
      .count();

    Self {
      average_cycle_length,
      average_period_length,
      variance,
      regularity_score,
      history_count: recent.len(),
      complete_count,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Prediction: derived, ephemeral, recomputed on demand
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
  pub next_period_start: NaiveDate,
  pub next_ovulation: NaiveDate,
  /// Bounded trust score, 10-95.
  pub confidence: i64,
  pub current_cycle_day: i64,
  pub current_phase: Phase,
  pub days_until_next_period: i64,
  /// Clamped to >= 0: an ovulation already behind us reads as "today".
  pub days_until_ovulation: i64,
}

/// Forecast the next period start and ovulation from recorded history.
/// Fails with `NoHistory` when no cycles exist.
pub fn predict(cycles: &[Cycle], as_of: NaiveDate) -> Result<Prediction, CoreError> {
  if cycles.is_empty() {
    return Err(CoreError::NoHistory);
  }

  let mut sorted: Vec<Cycle> = cycles.to_vec();
  sorted.sort_by(|a, b| b.start_date.cmp(&a.start_date));

  let stats = CycleStats::compute(&sorted);
  // Averages over positive samples (or the defaults), so the forward step
  // below is always at least one day.
  let average_length_days = stats.average_cycle_length.round() as i64;
  let average_period_days = stats.average_period_length.round() as i64;

  // Current framing: the cycle whose window contains as_of, if any.
  let (current_phase, current_cycle_day) = match sorted.iter().find(|c| c.contains(as_of)) {
    Some(current) => {
      let cycle_day = (as_of - current.start_date).num_days() + 1;
      let phase = PhaseBoundaryRule::OvulationAnchored.classify(
        cycle_day,
        average_length_days,
        average_period_days,
      );
      (phase, cycle_day)
    }
    // Between recorded windows: neutral default
    None => (Phase::Follicular, 1),
  };

  // Roll the most recent start forward until strictly after as_of.
  let mut next_period_start = sorted[0].start_date;
  while next_period_start <= as_of {
    next_period_start += Duration::days(average_length_days);
  }
  let next_ovulation = next_period_start - Duration::days(LUTEAL_OFFSET_DAYS);

  let confidence = confidence_score(&stats);

  let days_until_next_period = (next_period_start - as_of).num_days();
  let days_until_ovulation = (next_ovulation - as_of).num_days().max(0);

  debug!(
    next_period = %next_period_start,
    confidence,
    regularity = stats.regularity_score,
    "computed cycle prediction"
  );

  Ok(Prediction {
    next_period_start,
    next_ovulation,
    confidence,
    current_cycle_day,
    current_phase,
    days_until_next_period,
    days_until_ovulation,
  })
}

/// History depth and regularity raise confidence; incomplete records scale
/// the whole score down. Always lands in `[10, 95]`.
fn confidence_score(stats: &CycleStats) -> i64 {
  let history_bonus = (stats.history_count as f64 * 5.0).min(CONFIDENCE_HISTORY_CAP);
  let regularity_bonus = stats.regularity_score / 100.0 * CONFIDENCE_REGULARITY_WEIGHT;
  let complete_ratio = if stats.history_count > 0 {
    stats.complete_count as f64 / stats.history_count as f64
  } else {
    0.0
  };

  let raw = (CONFIDENCE_BASE + history_bonus + regularity_bonus) * complete_ratio;
  (raw.round() as i64).clamp(CONFIDENCE_MIN, CONFIDENCE_MAX)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
