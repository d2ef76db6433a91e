use serde::{Deserialize, Serialize};

/// Five-level ordinal intensity. Ordering matters: session-type filters
/// compare against it (e.g. cardio keeps `High` and above).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
  VeryLow,
  Low,
  Moderate,
  High,
  VeryHigh,
}

impl Intensity {
  pub fn as_str(&self) -> &'static str {
    match self {
      Intensity::VeryLow => "very_low",
      Intensity::Low => "low",
      Intensity::Moderate => "moderate",
      Intensity::High => "high",
      Intensity::VeryHigh => "very_high",
    }
  }

  /// Base rest interval in seconds before session-type scaling.
  pub fn base_rest_seconds(&self) -> i64 {
    match self {
      Intensity::VeryLow => 30,
      Intensity::Low => 45,
      Intensity::Moderate => 60,
      Intensity::High => 90,
      Intensity::VeryHigh => 120,
    }
  }
}

impl std::fmt::Display for Intensity {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl std::str::FromStr for Intensity {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "very_low" => Ok(Intensity::VeryLow),
      "low" => Ok(Intensity::Low),
      "moderate" => Ok(Intensity::Moderate),
      "high" => Ok(Intensity::High),
      "very_high" => Ok(Intensity::VeryHigh),
      _ => Err(format!("Unknown intensity: {}", s)),
    }
  }
}

/// Coarse target-area classification for an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleZone {
  UpperBody,
  LowerBody,
  Core,
  FullBody,
  Cardio,
  Flexibility,
  Balance,
}

impl MuscleZone {
  pub fn as_str(&self) -> &'static str {
    match self {
      MuscleZone::UpperBody => "upper_body",
      MuscleZone::LowerBody => "lower_body",
      MuscleZone::Core => "core",
      MuscleZone::FullBody => "full_body",
      MuscleZone::Cardio => "cardio",
      MuscleZone::Flexibility => "flexibility",
      MuscleZone::Balance => "balance",
    }
  }
}

impl std::fmt::Display for MuscleZone {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl std::str::FromStr for MuscleZone {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "upper_body" => Ok(MuscleZone::UpperBody),
      "lower_body" => Ok(MuscleZone::LowerBody),
      "core" => Ok(MuscleZone::Core),
      "full_body" => Ok(MuscleZone::FullBody),
      "cardio" => Ok(MuscleZone::Cardio),
      "flexibility" => Ok(MuscleZone::Flexibility),
      "balance" => Ok(MuscleZone::Balance),
      _ => Err(format!("Unknown muscle zone: {}", s)),
    }
  }
}

/// Catalog entry, read-only to this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
  pub id: i64,
  pub title: String,
  pub duration_minutes: Option<i64>,
  pub intensity: Intensity,
  pub muscle_zone: MuscleZone,
}

/// Filters handed to the catalog query capability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExerciseFilters {
  pub intensity: Option<Intensity>,
  pub muscle_zone: Option<MuscleZone>,
  pub max_duration_minutes: Option<i64>,
  pub limit: Option<i64>,
}
