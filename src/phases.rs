//! Phase calculation from a cycle record and a calendar date
//!
//! Two boundary strategies exist in the source data and both are kept as
//! named variants rather than unified:
//! - `PeriodAnchored` frames the menstrual stretch on the recorded period
//!   length. Used when a specific cycle record is the source of truth
//!   (`current_phase`).
//! - `OvulationAnchored` uses a fixed day-5 cutoff and estimates ovulation
//!   at `cycle_length - 14`, independent of any stored period length. Used
//!   by the predictor and the calendar synthesizer.
//!
//! The discrepancy between the two is deliberate framing (confirmed cycle
//! vs. statistical estimate), so callers select the rule matching their
//! semantics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::defaults::LUTEAL_OFFSET_DAYS;
use crate::error::CoreError;
use crate::models::Cycle;

/// ---------------------------------------------------------------------------
/// Phase: the four heuristic stretches of a cycle
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Menstrual,
  Follicular,
  Ovulation,
  Luteal,
}

impl Phase {
  pub fn as_str(&self) -> &'static str {
    match self {
      Phase::Menstrual => "menstrual",
      Phase::Follicular => "follicular",
      Phase::Ovulation => "ovulation",
      Phase::Luteal => "luteal",
    }
  }

  /// Human-readable label for titles and summaries.
  pub fn display_name(&self) -> &'static str {
    match self {
      Phase::Menstrual => "Menstrual",
      Phase::Follicular => "Follicular",
      Phase::Ovulation => "Ovulation",
      Phase::Luteal => "Luteal",
    }
  }

  pub fn description(&self) -> &'static str {
    match self {
      Phase::Menstrual => {
        "Menstruation. Energy is typically at its lowest; favor gentle movement and recovery."
      }
      Phase::Follicular => {
        "Rising estrogen. Energy and trainability climb; a good window to build volume."
      }
      Phase::Ovulation => {
        "Peak estrogen around ovulation. Strength and power tend to peak; mind joint laxity."
      }
      Phase::Luteal => {
        "Progesterone dominant. Higher resting heart rate and temperature; moderate loads suit best."
      }
    }
  }

  /// Short training guidance shown alongside the current phase.
  pub fn recommendations(&self) -> &'static [&'static str] {
    match self {
      Phase::Menstrual => &[
        "Prioritize sleep and iron-rich foods",
        "Keep sessions short and low intensity",
        "Gentle stretching can ease cramps",
      ],
      Phase::Follicular => &[
        "Gradually increase training volume",
        "Schedule skill work - coordination is sharp",
        "Carbohydrate tolerance is high",
      ],
      Phase::Ovulation => &[
        "Schedule peak-effort sessions now",
        "Warm up thoroughly - ligament laxity is elevated",
        "Hydrate more than usual",
      ],
      Phase::Luteal => &[
        "Favor steady moderate sessions over max efforts",
        "Expect a higher perceived effort at the same load",
        "Extra rest between hard sets helps",
      ],
    }
  }
}

impl std::fmt::Display for Phase {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl std::str::FromStr for Phase {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "menstrual" => Ok(Phase::Menstrual),
      "follicular" => Ok(Phase::Follicular),
      "ovulation" => Ok(Phase::Ovulation),
      "luteal" => Ok(Phase::Luteal),
      _ => Err(format!("Unknown phase: {}", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Boundary strategies
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseBoundaryRule {
  /// Menstrual stretch runs the recorded period length; ovulation spans
  /// `cycle_length/2 - 2 .. cycle_length/2 + 2` (0-based days).
  PeriodAnchored,
  /// Fixed day-5 menstrual cutoff; ovulation estimated at
  /// `cycle_length - 14` with a band through day `+2`.
  OvulationAnchored,
}

impl PhaseBoundaryRule {
  /// Classify a 1-based cycle day. `period_length` is only consulted by
  /// the period-anchored rule.
  pub fn classify(self, cycle_day: i64, cycle_length: i64, period_length: i64) -> Phase {
    match self {
      PhaseBoundaryRule::PeriodAnchored => {
        let day_in_cycle = cycle_day - 1;
        let midpoint = cycle_length / 2;
        if day_in_cycle < period_length {
          Phase::Menstrual
        } else if day_in_cycle < midpoint - 2 {
          Phase::Follicular
        } else if day_in_cycle < midpoint + 2 {
          Phase::Ovulation
        } else {
          Phase::Luteal
        }
      }
      PhaseBoundaryRule::OvulationAnchored => {
        let ovulation_day = cycle_length - LUTEAL_OFFSET_DAYS;
        if cycle_day <= 5 {
          Phase::Menstrual
        } else if cycle_day < ovulation_day {
          Phase::Follicular
        } else if cycle_day <= ovulation_day + 2 {
          Phase::Ovulation
        } else {
          Phase::Luteal
        }
      }
    }
  }
}

/// ---------------------------------------------------------------------------
/// Current-phase snapshot for a confirmed cycle record
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseSnapshot {
  pub phase: Phase,
  /// 1-based day within the (possibly recurring) cycle.
  pub cycle_day: i64,
  pub cycle_length: i64,
  pub period_length: i64,
  /// May be negative when lengths are misconfigured; callers must not
  /// assume non-negativity.
  pub days_until_next_phase: i64,
  pub description: String,
  pub recommendations: Vec<String>,
}

/// Compute the phase snapshot for `cycle` on `on_date`, treating the record
/// as recurring with its effective cycle length. Fails if `on_date` precedes
/// the recorded start.
pub fn current_phase(cycle: &Cycle, on_date: NaiveDate) -> Result<PhaseSnapshot, CoreError> {
  let days_since_start = (on_date - cycle.start_date).num_days();
  if days_since_start < 0 {
    return Err(CoreError::InvalidDate {
      date: on_date,
      cycle_start: cycle.start_date,
    });
  }

  let cycle_length = cycle.effective_cycle_length();
  let period_length = cycle.effective_period_length();
  let day_in_cycle = days_since_start % cycle_length;
  let cycle_day = day_in_cycle + 1;

  let phase = PhaseBoundaryRule::PeriodAnchored.classify(cycle_day, cycle_length, period_length);

  Ok(PhaseSnapshot {
    phase,
    cycle_day,
    cycle_length,
    period_length,
    days_until_next_phase: days_until_next_phase(phase, cycle_day, cycle_length, period_length),
    description: phase.description().to_string(),
    recommendations: phase
      .recommendations()
      .iter()
      .map(|r| r.to_string())
      .collect(),
  })
}

/// Days remaining until the next phase boundary under the period-anchored
/// rule. Negative results are possible with inconsistent lengths.
pub fn days_until_next_phase(
  phase: Phase,
  cycle_day: i64,
  cycle_length: i64,
  period_length: i64,
) -> i64 {
  let midpoint = cycle_length / 2;
  match phase {
    Phase::Menstrual => period_length - cycle_day + 1,
    Phase::Follicular => midpoint - 2 - cycle_day + 1,
    Phase::Ovulation => midpoint + 2 - cycle_day + 1,
    Phase::Luteal => cycle_length - cycle_day + 1,
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
