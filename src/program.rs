//! Phase-adapted program generation
//!
//! A query-then-transform pipeline: look up the phase profile, query the
//! catalog, narrow by session type, prioritize the focus zone, then greedily
//! pack exercises into the time budget. First-fit packing is deliberately
//! approximate; exercise durations are coarse and "close enough" beats
//! optimal. Nothing here persists anything.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;
use crate::models::{Exercise, ExerciseFilters, Intensity, MuscleZone};
use crate::phases::Phase;
use crate::store::ExerciseCatalog;

/// Allowed range for a requested session duration, minutes.
pub const DURATION_RANGE: std::ops::RangeInclusive<i64> = 10..=180;

/// Assumed duration for a catalog entry without one, minutes.
const DEFAULT_EXERCISE_DURATION: i64 = 10;

/// Packing stops once this fraction of the budget is filled.
const FILL_TARGET: f64 = 0.9;

/// Catalog query result cap; generous so the packer has options.
const CATALOG_LIMIT: i64 = 20;

/// ---------------------------------------------------------------------------
/// Session type
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
  Cardio,
  Strength,
  Flexibility,
  Mixed,
}

impl SessionType {
  pub fn as_str(&self) -> &'static str {
    match self {
      SessionType::Cardio => "cardio",
      SessionType::Strength => "strength",
      SessionType::Flexibility => "flexibility",
      SessionType::Mixed => "mixed",
    }
  }

  /// Rest-interval scaling for the session type.
  pub fn rest_multiplier(&self) -> f64 {
    match self {
      SessionType::Cardio => 0.7,
      SessionType::Strength => 1.3,
      SessionType::Flexibility => 0.5,
      SessionType::Mixed => 1.0,
    }
  }

  /// Whether an exercise belongs in this kind of session.
  fn admits(&self, exercise: &Exercise) -> bool {
    match self {
      SessionType::Cardio => {
        exercise.muscle_zone == MuscleZone::Cardio || exercise.intensity >= Intensity::High
      }
      SessionType::Strength => matches!(
        exercise.muscle_zone,
        MuscleZone::UpperBody | MuscleZone::LowerBody | MuscleZone::Core | MuscleZone::FullBody
      ),
      SessionType::Flexibility => {
        exercise.muscle_zone == MuscleZone::Flexibility
          || exercise.intensity <= Intensity::Low
      }
      SessionType::Mixed => true,
    }
  }
}

impl std::fmt::Display for SessionType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl std::str::FromStr for SessionType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "cardio" => Ok(SessionType::Cardio),
      "strength" => Ok(SessionType::Strength),
      "flexibility" => Ok(SessionType::Flexibility),
      "mixed" => Ok(SessionType::Mixed),
      _ => Err(format!("Unknown session type: {}", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Phase profile: intensity, preferred zones, rest scaling
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PhaseProfile {
  pub intensity: Intensity,
  pub preferred_zones: [MuscleZone; 2],
  pub rest_multiplier: f64,
}

/// The per-phase training profile, refined by session type. The phase enum
/// is closed, so the follicular row doubles as the documented default for
/// any framing where no better information exists.
pub fn phase_profile(phase: Phase, session_type: SessionType) -> PhaseProfile {
  match phase {
    Phase::Menstrual => PhaseProfile {
      intensity: if session_type == SessionType::Strength {
        Intensity::Low
      } else {
        Intensity::VeryLow
      },
      preferred_zones: [MuscleZone::Flexibility, MuscleZone::Core],
      rest_multiplier: 1.5,
    },
    Phase::Follicular => PhaseProfile {
      intensity: if session_type == SessionType::Cardio {
        Intensity::Moderate
      } else {
        Intensity::Low
      },
      preferred_zones: [MuscleZone::LowerBody, MuscleZone::Core],
      rest_multiplier: 1.2,
    },
    Phase::Ovulation => PhaseProfile {
      intensity: if session_type == SessionType::Flexibility {
        Intensity::Moderate
      } else {
        Intensity::High
      },
      preferred_zones: [MuscleZone::FullBody, MuscleZone::UpperBody],
      rest_multiplier: 1.0,
    },
    Phase::Luteal => PhaseProfile {
      intensity: Intensity::Moderate,
      preferred_zones: [MuscleZone::UpperBody, MuscleZone::Balance],
      rest_multiplier: 1.3,
    },
  }
}

/// ---------------------------------------------------------------------------
/// Generated program
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramRequest {
  pub phase: Phase,
  pub target_duration_minutes: i64,
  pub session_type: SessionType,
  pub focus_zone: Option<MuscleZone>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramExercise {
  pub exercise: Exercise,
  /// 1-based position in the session.
  pub order: i64,
  pub rest_time_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedProgram {
  pub title: String,
  pub description: String,
  pub phase: Phase,
  pub session_type: SessionType,
  pub exercises: Vec<ProgramExercise>,
  /// Sum of packed exercise durations; never exceeds the request budget.
  pub total_duration_minutes: i64,
  pub tips: Vec<String>,
  pub adaptations: Vec<String>,
}

/// Generate a time-boxed, phase-adapted session from the catalog.
pub async fn generate<C: ExerciseCatalog>(
  catalog: &C,
  request: &ProgramRequest,
) -> Result<GeneratedProgram, CoreError> {
  let target = request.target_duration_minutes;
  if !DURATION_RANGE.contains(&target) {
    return Err(CoreError::InvalidRange(format!(
      "target_duration_minutes {} not in {}..={}",
      target,
      DURATION_RANGE.start(),
      DURATION_RANGE.end(),
    )));
  }

  let profile = phase_profile(request.phase, request.session_type);

  // Cap per-exercise duration at a third of the budget so the packer has
  // room to combine entries.
  let filters = ExerciseFilters {
    intensity: Some(profile.intensity),
    muscle_zone: request.focus_zone,
    max_duration_minutes: Some(target / 3),
    limit: Some(CATALOG_LIMIT),
  };

  let found = catalog
    .find_exercises(&filters)
    .await
    .map_err(|e| CoreError::CatalogUnavailable(e.to_string()))?;

  let mut candidates: Vec<Exercise> = found
    .into_iter()
    .filter(|e| request.session_type.admits(e))
    .collect();

  if let Some(zone) = request.focus_zone {
    // Stable partition: focus-zone matches first, relative order kept
    let (matching, rest): (Vec<_>, Vec<_>) =
      candidates.into_iter().partition(|e| e.muscle_zone == zone);
    candidates = matching;
    candidates.extend(rest);
  }

  if candidates.is_empty() {
    return Err(CoreError::CatalogUnavailable(format!(
      "No {} exercises available at {} intensity",
      request.session_type, profile.intensity
    )));
  }

  let exercises = pack_exercises(candidates, target, &profile, request.session_type);
  if exercises.is_empty() {
    return Err(CoreError::CatalogUnavailable(format!(
      "No exercise fits a {} minute budget",
      target
    )));
  }

  let total_duration_minutes = exercises
    .iter()
    .map(|p| p.exercise.duration_minutes.unwrap_or(DEFAULT_EXERCISE_DURATION))
    .sum();

  debug!(
    phase = %request.phase,
    session = %request.session_type,
    picked = exercises.len(),
    total_duration_minutes,
    "packed session"
  );

  Ok(GeneratedProgram {
    title: format!(
      "{} {} session - {} min",
      request.phase.display_name(),
      request.session_type,
      target
    ),
    description: program_description(request.phase),
    phase: request.phase,
    session_type: request.session_type,
    exercises,
    total_duration_minutes,
    tips: program_tips(request.phase),
    adaptations: phase_adaptations(request.phase),
  })
}

/// First-fit greedy packing. Admits candidates in order while they fit the
/// budget; stops once the fill target is reached.
fn pack_exercises(
  candidates: Vec<Exercise>,
  target: i64,
  profile: &PhaseProfile,
  session_type: SessionType,
) -> Vec<ProgramExercise> {
  let fill_threshold = target as f64 * FILL_TARGET;
  let mut packed = Vec::new();
  let mut current = 0i64;

  for exercise in candidates {
    if current as f64 >= fill_threshold {
      break;
    }
    let duration = exercise.duration_minutes.unwrap_or(DEFAULT_EXERCISE_DURATION);
    if current + duration > target {
      continue;
    }
    current += duration;
    packed.push(ProgramExercise {
      rest_time_seconds: rest_seconds(exercise.intensity, profile, session_type),
      order: packed.len() as i64 + 1,
      exercise,
    });
  }

  packed
}

/// Base rest per intensity, scaled by the phase rest multiplier and the
/// session-type multiplier, floored to whole seconds.
fn rest_seconds(intensity: Intensity, profile: &PhaseProfile, session_type: SessionType) -> i64 {
  let scaled = intensity.base_rest_seconds() as f64
    * profile.rest_multiplier
    * session_type.rest_multiplier();
  scaled.floor() as i64
}

fn program_description(phase: Phase) -> String {
  match phase {
    Phase::Menstrual => {
      "A restorative session built around gentle movement while energy is low.".to_string()
    }
    Phase::Follicular => {
      "A progressive session that leans into rising energy and trainability.".to_string()
    }
    Phase::Ovulation => {
      "A peak-output session timed to the strongest days of the cycle.".to_string()
    }
    Phase::Luteal => {
      "A steady session with moderated loads and generous recovery.".to_string()
    }
  }
}

/// Three generic tips plus two phase-specific ones.
fn program_tips(phase: Phase) -> Vec<String> {
  let mut tips: Vec<String> = vec![
    "Warm up for at least five minutes before the first exercise".to_string(),
    "Stop any exercise that causes sharp pain".to_string(),
    "Drink water before, during, and after the session".to_string(),
  ];
  let specific: [&str; 2] = match phase {
    Phase::Menstrual => [
      "Swap any exercise for rest if cramps flare up",
      "A heat pack after the session can ease lower-back tension",
    ],
    Phase::Follicular => [
      "Add a little load or a few reps versus last week",
      "This is a good window to practice new movement patterns",
    ],
    Phase::Ovulation => [
      "Take full rest intervals before max-effort sets",
      "Be deliberate with landings - ligaments are more lax right now",
    ],
    Phase::Luteal => [
      "Expect effort to feel higher than usual at the same load",
      "Finish with a longer cool-down than you think you need",
    ],
  };
  tips.extend(specific.iter().map(|s| s.to_string()));
  tips
}

fn phase_adaptations(phase: Phase) -> Vec<String> {
  let adaptations: &[&str] = match phase {
    Phase::Menstrual => &[
      "Intensity capped low; favor floor-based and supported positions",
      "Rest intervals extended by half",
    ],
    Phase::Follicular => &[
      "Volume may build session to session",
      "Slightly extended rest to support adaptation",
    ],
    Phase::Ovulation => &[
      "Peak intensity unlocked; full-body compound work prioritized",
      "Standard rest intervals",
    ],
    Phase::Luteal => &[
      "Moderate intensity ceiling; balance work emphasized",
      "Rest intervals extended to offset elevated resting strain",
    ],
  };
  adaptations.iter().map(|s| s.to_string()).collect()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
