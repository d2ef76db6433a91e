pub mod cycle;
pub mod exercise;

pub use cycle::{Cycle, CycleConfig, NewCycle};
pub use exercise::{Exercise, ExerciseFilters, Intensity, MuscleZone};
