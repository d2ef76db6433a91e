//! Shared test infrastructure: in-memory stores, factories, seed data.
//! Compiled only for tests.

use chrono::{Duration, NaiveDate};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::models::{Intensity, MuscleZone, NewCycle};
use crate::store::SqliteStore;

/// Route engine tracing through the test harness output.
pub fn init_tracing() {
  let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Fresh in-memory SQLite database with migrations applied.
pub async fn setup_test_db() -> SqlitePool {
  init_tracing();
  // One connection so the in-memory database is shared across queries
  let pool = SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

pub async fn setup_test_store() -> SqliteStore {
  SqliteStore::new(setup_test_db().await)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Bare period-start log: lengths unknown, assumed regular.
pub fn new_cycle(user_id: &str, start_date: NaiveDate) -> NewCycle {
  NewCycle {
    user_id: user_id.to_string(),
    start_date,
    cycle_length: None,
    period_length: None,
    is_regular: true,
  }
}

/// Seed `count` perfectly regular 28-day cycles ending with one that starts
/// on `latest_start`. Earlier starts get back-filled lengths automatically.
pub async fn seed_regular_history(
  store: &SqliteStore,
  user_id: &str,
  latest_start: NaiveDate,
  count: i64,
) {
  for i in (0..count).rev() {
    let start = latest_start - Duration::days(28 * i);
    let mut cycle = new_cycle(user_id, start);
    cycle.period_length = Some(5);
    store
      .log_cycle(&cycle, start)
      .await
      .expect("Failed to seed cycle");
  }
}

/// A small catalog spanning every intensity, with short entries at the low
/// end so tight duration caps still find work.
pub async fn seed_test_exercises(store: &SqliteStore) {
  let entries: [(&str, Option<i64>, Intensity, MuscleZone); 10] = [
    ("Cat-cow flow", Some(5), Intensity::VeryLow, MuscleZone::Flexibility),
    ("Supine breathing", Some(5), Intensity::VeryLow, MuscleZone::Core),
    ("Child's pose hold", Some(4), Intensity::VeryLow, MuscleZone::Flexibility),
    ("Glute bridge", Some(8), Intensity::Low, MuscleZone::LowerBody),
    ("Dead bug", Some(6), Intensity::Low, MuscleZone::Core),
    ("Goblet squat", Some(10), Intensity::Moderate, MuscleZone::LowerBody),
    ("Single-leg balance reach", Some(8), Intensity::Moderate, MuscleZone::Balance),
    ("Dumbbell row", Some(10), Intensity::Moderate, MuscleZone::UpperBody),
    ("Kettlebell swing", Some(10), Intensity::High, MuscleZone::FullBody),
    ("Hill sprints", Some(12), Intensity::VeryHigh, MuscleZone::Cardio),
  ];

  for (title, duration, intensity, zone) in entries {
    store
      .add_exercise(title, duration, intensity, zone)
      .await
      .expect("Failed to seed exercise");
  }
}
