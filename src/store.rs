//! Storage seam: consumed capabilities and their SQLite implementation
//!
//! The engine consumes `list_cycles`/`get_config` (history) and
//! `find_exercises` (catalog) as single-shot async capabilities and owns no
//! retry policy. `SqliteStore` is the bundled implementation; callers with
//! their own persistence implement the traits instead.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::models::{Cycle, CycleConfig, Exercise, ExerciseFilters, NewCycle};

/// A start gap longer than this is a tracking break, not a cycle length,
/// and is never back-filled.
const MAX_INFERRED_CYCLE_GAP_DAYS: i64 = 60;

/// ---------------------------------------------------------------------------
/// Consumed capabilities
/// ---------------------------------------------------------------------------

/// History capability: recorded cycles and per-user tracking config.
pub trait CycleStore {
  /// All recorded cycles for a user, most recent start first.
  async fn list_cycles(&self, user_id: &str) -> Result<Vec<Cycle>, CoreError>;

  /// The user's tracking config, if one was ever created.
  async fn get_config(&self, user_id: &str) -> Result<Option<CycleConfig>, CoreError>;
}

/// Catalog capability: read-only exercise lookup.
pub trait ExerciseCatalog {
  async fn find_exercises(&self, filters: &ExerciseFilters) -> Result<Vec<Exercise>, CoreError>;
}

/// ---------------------------------------------------------------------------
/// SQLite implementation
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Connect to `url` and run migrations.
  pub async fn connect(url: &str) -> Result<Self, CoreError> {
    let pool = SqlitePoolOptions::new()
      .max_connections(5)
      .connect(url)
      .await?;

    sqlx::migrate!("./migrations")
      .run(&pool)
      .await
      .map_err(|e| CoreError::Decode(format!("Migration failed: {}", e)))?;

    info!(url, "cycle store ready");
    Ok(Self { pool })
  }

  pub fn pool(&self) -> &SqlitePool {
    &self.pool
  }

  /// Record a logged period start. `recorded_on` is the creation-time
  /// reference: a start date after it is rejected, as is any supplied
  /// length below one day. When the gap to the previous recorded start
  /// looks like a full cycle, that cycle's missing length is back-filled.
  pub async fn log_cycle(&self, new: &NewCycle, recorded_on: NaiveDate) -> Result<Cycle, CoreError> {
    if new.start_date > recorded_on {
      return Err(CoreError::InvalidRange(format!(
        "start_date {} is in the future (recorded on {})",
        new.start_date, recorded_on
      )));
    }
    if let Some(len) = new.cycle_length {
      if len < 1 {
        return Err(CoreError::InvalidRange(format!(
          "cycle_length {} must be at least 1 day",
          len
        )));
      }
    }
    if let Some(len) = new.period_length {
      if len < 1 {
        return Err(CoreError::InvalidRange(format!(
          "period_length {} must be at least 1 day",
          len
        )));
      }
    }

    let previous = self.latest_cycle_before(&new.user_id, new.start_date).await?;

    let result = sqlx::query(
      r#"
      INSERT INTO cycles (user_id, start_date, cycle_length, period_length, is_regular)
      VALUES (?1, ?2, ?3, ?4, ?5)
      "#,
    )
    .bind(&new.user_id)
    .bind(new.start_date)
    .bind(new.cycle_length)
    .bind(new.period_length)
    .bind(new.is_regular)
    .execute(&self.pool)
    .await?;
    let id = result.last_insert_rowid();

    if let Some(prev) = previous {
      let gap = (new.start_date - prev.start_date).num_days();
      if prev.cycle_length.is_none() && gap >= 1 && gap <= MAX_INFERRED_CYCLE_GAP_DAYS {
        debug!(cycle_id = prev.id, gap, "back-filling cycle length from next start");
        sqlx::query("UPDATE cycles SET cycle_length = ?1 WHERE id = ?2")
          .bind(gap)
          .bind(prev.id)
          .execute(&self.pool)
          .await?;
      }
    }

    self.get_cycle(id).await
  }

  /// Back-fill a period length once the end of bleeding is logged.
  pub async fn close_cycle(&self, cycle_id: i64, end_date: NaiveDate) -> Result<Cycle, CoreError> {
    let cycle = self.get_cycle(cycle_id).await?;
    let period_length = (end_date - cycle.start_date).num_days() + 1;
    if period_length < 1 {
      return Err(CoreError::InvalidRange(format!(
        "end_date {} precedes cycle start {}",
        end_date, cycle.start_date
      )));
    }

    sqlx::query("UPDATE cycles SET period_length = ?1 WHERE id = ?2")
      .bind(period_length)
      .bind(cycle_id)
      .execute(&self.pool)
      .await?;

    self.get_cycle(cycle_id).await
  }

  pub async fn get_cycle(&self, id: i64) -> Result<Cycle, CoreError> {
    let row = sqlx::query(
      r#"
      SELECT id, user_id, start_date, cycle_length, period_length, is_regular, created_at
      FROM cycles WHERE id = ?1
      "#,
    )
    .bind(id)
    .fetch_one(&self.pool)
    .await?;

    cycle_from_row(&row)
  }

  async fn latest_cycle_before(
    &self,
    user_id: &str,
    date: NaiveDate,
  ) -> Result<Option<Cycle>, CoreError> {
    let row = sqlx::query(
      r#"
      SELECT id, user_id, start_date, cycle_length, period_length, is_regular, created_at
      FROM cycles WHERE user_id = ?1 AND start_date < ?2
      ORDER BY start_date DESC LIMIT 1
      "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(&self.pool)
    .await?;

    row.as_ref().map(cycle_from_row).transpose()
  }

  /// Validate and write the user's config, creating the row on first use.
  pub async fn upsert_config(&self, user_id: &str, config: &CycleConfig) -> Result<(), CoreError> {
    config.validate()?;

    sqlx::query(
      r#"
      INSERT INTO cycle_configs (
        user_id, tracking_enabled, uses_external_provider, menopause_mode,
        average_cycle_length, average_period_length, prefers_manual_input, updated_at
      )
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, CURRENT_TIMESTAMP)
      ON CONFLICT(user_id) DO UPDATE SET
        tracking_enabled = excluded.tracking_enabled,
        uses_external_provider = excluded.uses_external_provider,
        menopause_mode = excluded.menopause_mode,
        average_cycle_length = excluded.average_cycle_length,
        average_period_length = excluded.average_period_length,
        prefers_manual_input = excluded.prefers_manual_input,
        updated_at = CURRENT_TIMESTAMP
      "#,
    )
    .bind(user_id)
    .bind(config.tracking_enabled)
    .bind(config.uses_external_provider)
    .bind(config.menopause_mode)
    .bind(config.average_cycle_length)
    .bind(config.average_period_length)
    .bind(config.prefers_manual_input)
    .execute(&self.pool)
    .await?;

    Ok(())
  }

  /// Fetch the user's config, lazily creating the default on first
  /// cycle-related interaction.
  pub async fn ensure_config(&self, user_id: &str) -> Result<CycleConfig, CoreError> {
    if let Some(config) = self.get_config(user_id).await? {
      return Ok(config);
    }
    let config = CycleConfig::default();
    self.upsert_config(user_id, &config).await?;
    Ok(config)
  }

  /// Catalog write used by seeds and tests; the engine itself never writes
  /// exercises.
  pub async fn add_exercise(
    &self,
    title: &str,
    duration_minutes: Option<i64>,
    intensity: crate::models::Intensity,
    muscle_zone: crate::models::MuscleZone,
  ) -> Result<i64, CoreError> {
    let result = sqlx::query(
      r#"
      INSERT INTO exercises (title, duration_minutes, intensity, muscle_zone)
      VALUES (?1, ?2, ?3, ?4)
      "#,
    )
    .bind(title)
    .bind(duration_minutes)
    .bind(intensity.as_str())
    .bind(muscle_zone.as_str())
    .execute(&self.pool)
    .await?;

    Ok(result.last_insert_rowid())
  }
}

impl CycleStore for SqliteStore {
  async fn list_cycles(&self, user_id: &str) -> Result<Vec<Cycle>, CoreError> {
    let rows = sqlx::query(
      r#"
      SELECT id, user_id, start_date, cycle_length, period_length, is_regular, created_at
      FROM cycles WHERE user_id = ?1
      ORDER BY start_date DESC
      "#,
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;

    rows.iter().map(cycle_from_row).collect()
  }

  async fn get_config(&self, user_id: &str) -> Result<Option<CycleConfig>, CoreError> {
    let row = sqlx::query(
      r#"
      SELECT tracking_enabled, uses_external_provider, menopause_mode,
             average_cycle_length, average_period_length, prefers_manual_input
      FROM cycle_configs WHERE user_id = ?1
      "#,
    )
    .bind(user_id)
    .fetch_optional(&self.pool)
    .await?;

    Ok(row.map(|row| CycleConfig {
      tracking_enabled: row.get("tracking_enabled"),
      uses_external_provider: row.get("uses_external_provider"),
      menopause_mode: row.get("menopause_mode"),
      average_cycle_length: row.get("average_cycle_length"),
      average_period_length: row.get("average_period_length"),
      prefers_manual_input: row.get("prefers_manual_input"),
    }))
  }
}

impl ExerciseCatalog for SqliteStore {
  async fn find_exercises(&self, filters: &ExerciseFilters) -> Result<Vec<Exercise>, CoreError> {
    let rows = sqlx::query(
      r#"
      SELECT id, title, duration_minutes, intensity, muscle_zone
      FROM exercises
      WHERE (?1 IS NULL OR intensity = ?1)
        AND (?2 IS NULL OR muscle_zone = ?2)
        AND (?3 IS NULL OR duration_minutes IS NULL OR duration_minutes <= ?3)
      ORDER BY id
      LIMIT ?4
      "#,
    )
    .bind(filters.intensity.map(|i| i.as_str()))
    .bind(filters.muscle_zone.map(|z| z.as_str()))
    .bind(filters.max_duration_minutes)
    .bind(filters.limit.unwrap_or(50))
    .fetch_all(&self.pool)
    .await?;

    rows
      .iter()
      .map(|row| {
        let intensity: String = row.get("intensity");
        let muscle_zone: String = row.get("muscle_zone");
        Ok(Exercise {
          id: row.get("id"),
          title: row.get("title"),
          duration_minutes: row.get("duration_minutes"),
          intensity: intensity.parse().map_err(CoreError::Decode)?,
          muscle_zone: muscle_zone.parse().map_err(CoreError::Decode)?,
        })
      })
      .collect()
  }
}

fn cycle_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Cycle, CoreError> {
  let created_at: Option<String> = row.get("created_at");
  Ok(Cycle {
    id: row.get("id"),
    user_id: row.get("user_id"),
    start_date: row.get("start_date"),
    cycle_length: row.get("cycle_length"),
    period_length: row.get("period_length"),
    is_regular: row.get("is_regular"),
    created_at: created_at.and_then(parse_sqlite_timestamp),
  })
}

// CURRENT_TIMESTAMP writes "YYYY-MM-DD HH:MM:SS" in UTC.
fn parse_sqlite_timestamp(s: String) -> Option<DateTime<Utc>> {
  NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S")
    .ok()
    .map(|dt| dt.and_utc())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
