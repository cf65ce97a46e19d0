use std::fmt;

use anyhow::anyhow;
use chrono::{
  DateTime,
  Duration,
  Local,
  LocalResult,
  NaiveDate,
  NaiveDateTime,
  TimeZone,
  Utc
};
use chrono_tz::Tz;

/// The zone whose wall clock decides which calendar day an instant
/// falls on and how its time label reads.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default,
)]
pub enum DisplayZone {
  #[default]
  Local,
  Named(Tz)
}

impl DisplayZone {
  /// Accepts an IANA id, or `local`/empty for the system zone.
  pub fn parse(
    raw: &str
  ) -> anyhow::Result<Self> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
      || trimmed
        .eq_ignore_ascii_case("local")
    {
      return Ok(Self::Local);
    }

    trimmed
      .parse::<Tz>()
      .map(Self::Named)
      .map_err(|err| {
        anyhow!(
          "unknown timezone id \
           {trimmed}: {err}"
        )
      })
  }

  #[must_use]
  pub fn wall_clock(
    &self,
    instant: DateTime<Utc>
  ) -> NaiveDateTime {
    match self {
      | Self::Local => {
        instant
          .with_timezone(&Local)
          .naive_local()
      }
      | Self::Named(tz) => {
        instant
          .with_timezone(tz)
          .naive_local()
      }
    }
  }

  #[must_use]
  pub fn today(
    &self,
    now: DateTime<Utc>
  ) -> NaiveDate {
    self.wall_clock(now).date()
  }

  /// Interprets a wall-clock reading in this zone. Ambiguous readings
  /// take the earlier instant; readings inside a DST gap move forward
  /// one hour.
  pub fn from_wall_clock(
    &self,
    naive: NaiveDateTime
  ) -> anyhow::Result<DateTime<Utc>> {
    let resolved = self
      .resolve(naive)
      .or_else(|| {
        let shifted =
          naive + Duration::hours(1);
        tracing::warn!(
          zone = %self,
          local = %naive,
          "local time falls in a gap; shifting forward"
        );
        self.resolve(shifted)
      });

    resolved.ok_or_else(|| {
      anyhow!(
        "local datetime {naive} does \
         not exist in {}",
        self
      )
    })
  }

  fn resolve(
    &self,
    naive: NaiveDateTime
  ) -> Option<DateTime<Utc>> {
    match self {
      | Self::Local => earliest(
        Local.from_local_datetime(&naive)
      ),
      | Self::Named(tz) => earliest(
        tz.from_local_datetime(&naive)
      )
    }
  }
}

impl fmt::Display for DisplayZone {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    match self {
      | Self::Local => f.write_str("local"),
      | Self::Named(tz) => {
        f.write_str(tz.name())
      }
    }
  }
}

fn earliest<Z: TimeZone>(
  result: LocalResult<DateTime<Z>>
) -> Option<DateTime<Utc>> {
  match result {
    | LocalResult::Single(dt) => {
      Some(dt.with_timezone(&Utc))
    }
    | LocalResult::Ambiguous(
      first,
      second
    ) => {
      let chosen = if first <= second {
        first
      } else {
        second
      };
      Some(chosen.with_timezone(&Utc))
    }
    | LocalResult::None => None
  }
}
