//! Cycle-aware training engine
//!
//! Infers the current menstrual phase from recorded cycle history, forecasts
//! upcoming periods and ovulation, renders a multi-month calendar, and
//! generates phase-adapted exercise sessions. The engine core (`phases`,
//! `prediction`, `calendar`, `program`) is pure computation; persistence
//! hangs off the `store` traits and the bundled SQLite implementation.

pub mod api;
pub mod calendar;
pub mod defaults;
pub mod error;
pub mod models;
pub mod phases;
pub mod prediction;
pub mod program;
pub mod store;

#[cfg(test)]
pub mod test_utils;

pub use api::{CalendarView, ProgramOptions};
pub use calendar::{CalendarDay, DayType};
pub use error::CoreError;
pub use models::{Cycle, CycleConfig, Exercise, ExerciseFilters, Intensity, MuscleZone, NewCycle};
pub use phases::{Phase, PhaseBoundaryRule, PhaseSnapshot};
pub use prediction::{CycleStats, Prediction};
pub use program::{GeneratedProgram, ProgramRequest, SessionType};
pub use store::{CycleStore, ExerciseCatalog, SqliteStore};
