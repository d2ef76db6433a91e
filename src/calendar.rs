//! Calendar synthesis: confirmed history blended with predictions
//!
//! A serial day-by-day walk over a month range. Confirmed cycle windows win;
//! days outside any window fall back to the prediction overlay when one is
//! supplied. Output order (one entry per date, ascending) is a correctness
//! contract consumers rely on.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::defaults::LUTEAL_OFFSET_DAYS;
use crate::models::Cycle;
use crate::phases::{Phase, PhaseBoundaryRule};
use crate::prediction::Prediction;

/// Fertile window before the estimated ovulation day, in days.
const FERTILE_LEAD_DAYS: i64 = 5;

/// Fertile tail after the estimated ovulation day, in days.
const FERTILE_TAIL_DAYS: i64 = 1;

/// ---------------------------------------------------------------------------
/// Day classification
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
  PeriodStart,
  PeriodDay,
  Ovulation,
  Fertile,
  Normal,
  PredictedPeriod,
  PredictedOvulation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDay {
  pub date: NaiveDate,
  pub phase: Option<Phase>,
  /// 1-based day within the confirmed cycle, absent for predicted days.
  pub cycle_day: Option<i64>,
  pub day_type: DayType,
  pub events: Option<Vec<String>>,
  pub is_predicted: bool,
}

/// ---------------------------------------------------------------------------
/// Synthesis
/// ---------------------------------------------------------------------------

/// Build one `CalendarDay` per date over `month_count` whole months starting
/// with the month containing `month_start`. Cycles are searched in the order
/// given; the first window containing a date wins.
pub fn build_calendar(
  cycles: &[Cycle],
  prediction: Option<&Prediction>,
  month_start: NaiveDate,
  month_count: u32,
) -> Vec<CalendarDay> {
  let (range_start, range_end) = month_span(month_start, month_count);

  let mut days = Vec::with_capacity(((range_end - range_start).num_days() + 1) as usize);
  let mut date = range_start;
  while date <= range_end {
    days.push(classify_day(cycles, prediction, date));
    date += Duration::days(1);
  }
  days
}

/// Inclusive `[first day, last day]` span of `month_count` months.
fn month_span(month_start: NaiveDate, month_count: u32) -> (NaiveDate, NaiveDate) {
  let first = month_start
    .with_day(1)
    .unwrap_or(month_start);
  let last = first + Months::new(month_count.max(1)) - Duration::days(1);
  (first, last)
}

fn classify_day(
  cycles: &[Cycle],
  prediction: Option<&Prediction>,
  date: NaiveDate,
) -> CalendarDay {
  if let Some(cycle) = cycles.iter().find(|c| c.contains(date)) {
    return confirmed_day(cycle, date);
  }

  if let Some(p) = prediction {
    return predicted_day(p, date);
  }

  CalendarDay {
    date,
    phase: None,
    cycle_day: None,
    day_type: DayType::Normal,
    events: None,
    is_predicted: false,
  }
}

fn confirmed_day(cycle: &Cycle, date: NaiveDate) -> CalendarDay {
  let cycle_length = cycle.effective_cycle_length();
  let period_length = cycle.effective_period_length();
  let cycle_day = (date - cycle.start_date).num_days() + 1;
  let phase = PhaseBoundaryRule::OvulationAnchored.classify(cycle_day, cycle_length, period_length);

  let ovulation_day = cycle_length - LUTEAL_OFFSET_DAYS;
  let fertile_window = (ovulation_day - FERTILE_LEAD_DAYS)..=(ovulation_day + FERTILE_TAIL_DAYS);

  let day_type = if cycle_day == 1 {
    DayType::PeriodStart
  } else if cycle_day <= period_length {
    DayType::PeriodDay
  } else if phase == Phase::Ovulation {
    DayType::Ovulation
  } else if fertile_window.contains(&cycle_day) {
    DayType::Fertile
  } else {
    DayType::Normal
  };

  CalendarDay {
    date,
    phase: Some(phase),
    cycle_day: Some(cycle_day),
    day_type,
    events: None,
    is_predicted: false,
  }
}

fn predicted_day(prediction: &Prediction, date: NaiveDate) -> CalendarDay {
  let day_type = if date == prediction.next_period_start {
    DayType::PredictedPeriod
  } else if date == prediction.next_ovulation {
    DayType::PredictedOvulation
  } else if (date - prediction.next_ovulation).num_days().abs() <= 2 {
    DayType::Fertile
  } else {
    DayType::Normal
  };

  CalendarDay {
    date,
    phase: None,
    cycle_day: None,
    day_type,
    events: None,
    is_predicted: true,
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn cycle(id: i64, start: NaiveDate, len: i64, plen: i64) -> Cycle {
    Cycle {
      id,
      user_id: "u1".to_string(),
      start_date: start,
      cycle_length: Some(len),
      period_length: Some(plen),
      is_regular: true,
      created_at: None,
    }
  }

  fn prediction(period: NaiveDate) -> Prediction {
    Prediction {
      next_period_start: period,
      next_ovulation: period - Duration::days(14),
      confidence: 80,
      current_cycle_day: 1,
      current_phase: Phase::Follicular,
      days_until_next_period: 10,
      days_until_ovulation: 0,
    }
  }

  #[test]
  fn test_calendar_completeness_and_ordering() {
    // Jan + Feb (leap) + Mar 2024 = 31 + 29 + 31 days
    let days = build_calendar(&[], None, date(2024, 1, 15), 3);
    assert_eq!(days.len(), 91);
    assert_eq!(days[0].date, date(2024, 1, 1));
    assert_eq!(days.last().unwrap().date, date(2024, 3, 31));

    for pair in days.windows(2) {
      assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
    }
  }

  #[test]
  fn test_single_month_span() {
    let days = build_calendar(&[], None, date(2024, 2, 10), 1);
    assert_eq!(days.len(), 29);
    assert_eq!(days[0].date, date(2024, 2, 1));
    assert_eq!(days.last().unwrap().date, date(2024, 2, 29));
  }

  #[test]
  fn test_confirmed_cycle_classification() {
    let cycles = vec![cycle(1, date(2024, 4, 5), 28, 5)];
    let days = build_calendar(&cycles, None, date(2024, 4, 1), 1);

    let at = |d: u32| days.iter().find(|day| day.date == date(2024, 4, d)).unwrap();

    assert_eq!(at(5).day_type, DayType::PeriodStart);
    assert_eq!(at(5).cycle_day, Some(1));
    assert_eq!(at(6).day_type, DayType::PeriodDay);
    assert_eq!(at(9).day_type, DayType::PeriodDay);
    assert!(!at(9).is_predicted);

    // Ovulation estimate: day 14 (Apr 18), band through day 16
    assert_eq!(at(18).day_type, DayType::Ovulation);
    assert_eq!(at(18).phase, Some(Phase::Ovulation));
    assert_eq!(at(20).day_type, DayType::Ovulation);

    // Fertile lead: days 9-13 (Apr 13-17)
    assert_eq!(at(13).day_type, DayType::Fertile);
    assert_eq!(at(17).day_type, DayType::Fertile);

    // Luteal stretch is plain
    assert_eq!(at(25).day_type, DayType::Normal);
    assert_eq!(at(25).phase, Some(Phase::Luteal));
  }

  #[test]
  fn test_days_before_cycle_are_unclassified() {
    let cycles = vec![cycle(1, date(2024, 4, 10), 28, 5)];
    let days = build_calendar(&cycles, None, date(2024, 4, 1), 1);

    let day = days.iter().find(|d| d.date == date(2024, 4, 3)).unwrap();
    assert_eq!(day.day_type, DayType::Normal);
    assert_eq!(day.phase, None);
    assert!(!day.is_predicted);
  }

  #[test]
  fn test_prediction_overlay() {
    let p = prediction(date(2024, 5, 20));
    let days = build_calendar(&[], Some(&p), date(2024, 5, 1), 1);

    let at = |d: u32| days.iter().find(|day| day.date == date(2024, 5, d)).unwrap();

    assert_eq!(at(20).day_type, DayType::PredictedPeriod);
    assert!(at(20).is_predicted);
    assert_eq!(at(6).day_type, DayType::PredictedOvulation);
    assert_eq!(at(4).day_type, DayType::Fertile);
    assert_eq!(at(8).day_type, DayType::Fertile);
    assert_eq!(at(12).day_type, DayType::Normal);
    assert!(at(12).is_predicted);
  }

  #[test]
  fn test_confirmed_window_beats_prediction() {
    let cycles = vec![cycle(1, date(2024, 5, 1), 28, 5)];
    let p = prediction(date(2024, 5, 10));
    let days = build_calendar(&cycles, Some(&p), date(2024, 5, 1), 1);

    // May 10 sits inside the confirmed window, so the predicted-period
    // mark never appears.
    let day = days.iter().find(|d| d.date == date(2024, 5, 10)).unwrap();
    assert!(!day.is_predicted);
    assert_ne!(day.day_type, DayType::PredictedPeriod);
  }

  #[test]
  fn test_overlapping_cycles_first_match_wins() {
    let a = cycle(1, date(2024, 5, 1), 28, 5);
    let b = cycle(2, date(2024, 5, 3), 28, 7);
    let days = build_calendar(&[a, b], None, date(2024, 5, 1), 1);

    // May 3 is day 3 of cycle `a`, not day 1 of cycle `b`.
    let day = days.iter().find(|d| d.date == date(2024, 5, 3)).unwrap();
    assert_eq!(day.cycle_day, Some(3));
    assert_eq!(day.day_type, DayType::PeriodDay);
  }
}
