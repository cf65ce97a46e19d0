use std::fmt::{
  self,
  Write as _
};

use chrono::{
  Datelike,
  NaiveDate,
  NaiveDateTime
};

pub const DEFAULT_TIME_FORMAT: &str =
  "%H:%M";
pub const NO_START_LABEL: &str =
  "No start date";

/// Recurrence rule of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frequency {
  Once,
  Weekly,
  Monthly,
  Yearly,
  /// Kept verbatim; never matches a date.
  Unrecognized(String)
}

impl Frequency {
  #[must_use]
  pub fn parse(raw: &str) -> Self {
    match raw {
      | "once" => Self::Once,
      | "weekly" => Self::Weekly,
      | "monthly" => Self::Monthly,
      | "yearly" => Self::Yearly,
      | other => {
        Self::Unrecognized(
          other.to_string()
        )
      }
    }
  }

  #[must_use]
  pub fn as_str(&self) -> &str {
    match self {
      | Self::Once => "once",
      | Self::Weekly => "weekly",
      | Self::Monthly => "monthly",
      | Self::Yearly => "yearly",
      | Self::Unrecognized(raw) => {
        raw.as_str()
      }
    }
  }
}

impl fmt::Display for Frequency {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One calendar entry. `start` and `end` are wall-clock readings in
/// the display zone the event was loaded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
  pub name:      String,
  pub frequency: Frequency,
  pub start:     Option<NaiveDateTime>,
  pub end:       Option<NaiveDateTime>
}

impl Event {
  #[must_use]
  pub fn new(
    name: impl Into<String>,
    frequency: Frequency,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>
  ) -> Self {
    Self {
      name: name.into(),
      frequency,
      start,
      end
    }
  }

  /// Whether the event lands on `date`.
  ///
  /// Repeating rules only fire on or after the start day. `end` never
  /// widens an occurrence. A monthly event anchored on the 29th-31st
  /// skips months that lack that day.
  ///
  /// Only calendar dates are compared, never instants: a repeating
  /// event that starts late in the evening still lands on its own start
  /// day.
  #[must_use]
  pub fn occurs_on(
    &self,
    date: NaiveDate
  ) -> bool {
    let Some(start) = self.start else {
      return false;
    };
    let s = start.date();

    match self.frequency {
      | Frequency::Once => s == date,
      | Frequency::Weekly => {
        date >= s
          && s.weekday() == date.weekday()
      }
      | Frequency::Monthly => {
        date >= s && s.day() == date.day()
      }
      | Frequency::Yearly => {
        date >= s
          && s.month() == date.month()
          && s.day() == date.day()
      }
      | Frequency::Unrecognized(_) => {
        false
      }
    }
  }

  /// `"<start> – <end>"`, just `"<start>"` without an end, or
  /// [`NO_START_LABEL`].
  #[must_use]
  pub fn format_time_range(
    &self,
    time_format: &str
  ) -> String {
    let Some(start) = self.start else {
      return NO_START_LABEL.to_string();
    };

    let start_label =
      format_clock(start, time_format);
    match self.end {
      | Some(end) => {
        format!(
          "{start_label} – {}",
          format_clock(end, time_format)
        )
      }
      | None => start_label
    }
  }
}

fn format_clock(
  at: NaiveDateTime,
  time_format: &str
) -> String {
  let mut out = String::new();
  if write!(out, "{}", at.format(time_format))
    .is_err()
  {
    tracing::warn!(
      time_format,
      "invalid time format; using default"
    );
    return at
      .format(DEFAULT_TIME_FORMAT)
      .to_string();
  }
  out
}
