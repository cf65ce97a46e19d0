use chrono::{
  Datelike,
  Duration,
  NaiveDate
};

use crate::event::Event;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default,
)]
pub enum WeekStart {
  #[default]
  Sunday,
  Monday
}

impl WeekStart {
  /// Anything other than `monday` keeps the Sunday-first layout.
  #[must_use]
  pub fn from_setting(raw: &str) -> Self {
    if raw
      .trim()
      .eq_ignore_ascii_case("monday")
    {
      Self::Monday
    } else {
      Self::Sunday
    }
  }
}

/// A matched event as it appears inside a day cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEvent {
  pub name:       String,
  pub time_label: String
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
  pub date:     NaiveDate,
  pub is_today: bool,
  pub events:   Vec<CellEvent>
}

impl DayCell {
  #[must_use]
  pub fn day(&self) -> u32 {
    self.date.day()
  }
}

/// The month containing `today`: blank cells before day 1, then one
/// cell per day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
  pub year:           i32,
  pub month:          u32,
  pub week_start:     WeekStart,
  pub leading_blanks: u32,
  pub days:           Vec<DayCell>
}

impl MonthGrid {
  #[tracing::instrument(skip(events, time_format), fields(events = events.len()))]
  #[must_use]
  pub fn build(
    today: NaiveDate,
    week_start: WeekStart,
    events: &[Event],
    time_format: &str
  ) -> Self {
    let first = first_day_of_month(
      today.year(),
      today.month()
    )
    .unwrap_or(today);
    let total = days_in_month(
      today.year(),
      today.month()
    );

    let days = (0..total)
      .map(|offset| {
        let date = add_days(
          first,
          i64::from(offset)
        );
        let matched = events
          .iter()
          .filter(|event| {
            event.occurs_on(date)
          })
          .map(|event| CellEvent {
            name:       event.name.clone(),
            time_label: event
              .format_time_range(
                time_format
              )
          })
          .collect();

        DayCell {
          date,
          is_today: date == today,
          events: matched
        }
      })
      .collect::<Vec<_>>();

    let grid = Self {
      year: today.year(),
      month: today.month(),
      week_start,
      leading_blanks: leading_blanks(
        first, week_start
      ),
      days
    };

    tracing::debug!(
      year = grid.year,
      month = grid.month,
      blanks = grid.leading_blanks,
      days = grid.days.len(),
      placed = grid.placed_count(),
      "built month grid"
    );
    grid
  }

  /// e.g. `October 2026`.
  #[must_use]
  pub fn title(&self) -> String {
    first_day_of_month(
      self.year, self.month
    )
    .map(|first| {
      first.format("%B %Y").to_string()
    })
    .unwrap_or_default()
  }

  #[cfg(test)]
  fn cell(
    &self,
    day: u32
  ) -> Option<&DayCell> {
    self
      .days
      .iter()
      .find(|cell| cell.day() == day)
  }

  #[must_use]
  pub fn placed_count(&self) -> usize {
    self
      .days
      .iter()
      .map(|cell| cell.events.len())
      .sum()
  }
}

#[must_use]
pub fn first_day_of_month(
  year: i32,
  month: u32
) -> Option<NaiveDate> {
  NaiveDate::from_ymd_opt(year, month, 1)
}

/// The day before the first of the following month.
#[must_use]
pub fn days_in_month(
  year: i32,
  month: u32
) -> u32 {
  let (next_year, next_month) =
    if month >= 12 {
      (year.saturating_add(1), 1_u32)
    } else {
      (year, month + 1)
    };

  first_day_of_month(
    next_year, next_month
  )
  .and_then(|first| first.pred_opt())
  .map(|last| last.day())
  .unwrap_or(0)
}

#[must_use]
pub fn leading_blanks(
  first: NaiveDate,
  week_start: WeekStart
) -> u32 {
  match week_start {
    | WeekStart::Sunday => {
      first.weekday().num_days_from_sunday()
    }
    | WeekStart::Monday => {
      first.weekday().num_days_from_monday()
    }
  }
}

#[must_use]
pub fn weekday_labels(
  week_start: WeekStart
) -> [&'static str; 7] {
  match week_start {
    | WeekStart::Sunday => [
      "Sun", "Mon", "Tue", "Wed", "Thu",
      "Fri", "Sat"
    ],
    | WeekStart::Monday => [
      "Mon", "Tue", "Wed", "Thu", "Fri",
      "Sat", "Sun"
    ]
  }
}

fn add_days(
  date: NaiveDate,
  days: i64
) -> NaiveDate {
  date
    .checked_add_signed(Duration::days(
      days
    ))
    .unwrap_or(date)
}
