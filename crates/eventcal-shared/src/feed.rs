use anyhow::{
  Context,
  anyhow
};
use chrono::{
  DateTime,
  NaiveDate,
  NaiveDateTime,
  Utc
};
use serde::Deserialize;

use crate::event::{
  Event,
  Frequency
};
use crate::zone::DisplayZone;

pub const DEFAULT_FEED: &str =
  "events.json";
pub const LOAD_ERROR_PREFIX: &str =
  "Could not load events";

const LOCAL_DATETIME_FORMATS: [&str; 6] = [
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%d %H:%M:%S",
  "%Y-%m-%d %H:%M"
];

const OFFSET_DATETIME_FORMATS: [&str; 4] = [
  "%Y-%m-%dT%H:%M%:z",
  "%Y-%m-%dT%H:%M%z",
  "%Y-%m-%dT%H:%M:%S%.f%:z",
  "%Y-%m-%dT%H:%M:%S%.f%z"
];

/// One element of the events JSON array, as published.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Default,
  Deserialize,
)]
pub struct EventRecord {
  #[serde(default)]
  pub name:      String,
  #[serde(default)]
  pub frequency: String,
  #[serde(default)]
  pub start:     Option<String>,
  #[serde(default)]
  pub end:       Option<String>
}

/// Parses an instant the way a browser's `Date` constructor reads the
/// feed: explicit offsets are honoured, offset-less date-times are wall
/// clock in `zone`, and date-only forms (`YYYY-MM-DD`, `YYYY-MM`,
/// `YYYY`) are UTC midnight of their first day.
#[tracing::instrument(skip(zone), fields(zone = %zone))]
pub fn parse_instant(
  raw: &str,
  zone: &DisplayZone
) -> anyhow::Result<DateTime<Utc>> {
  let token = raw.trim();

  if let Ok(dt) =
    DateTime::parse_from_rfc3339(token)
  {
    return Ok(dt.with_timezone(&Utc));
  }

  let with_offset = match token
    .strip_suffix('Z')
    .or_else(|| token.strip_suffix('z'))
  {
    | Some(rest) => format!("{rest}+00:00"),
    | None => token.to_string()
  };
  for fmt in OFFSET_DATETIME_FORMATS {
    if let Ok(dt) =
      DateTime::parse_from_str(
        &with_offset,
        fmt
      )
    {
      return Ok(dt.with_timezone(&Utc));
    }
  }

  for fmt in LOCAL_DATETIME_FORMATS {
    if let Ok(ndt) =
      NaiveDateTime::parse_from_str(
        token, fmt
      )
    {
      return zone.from_wall_clock(ndt);
    }
  }

  if let Some(date) = parse_date_only(token)
  {
    let midnight = date
      .and_hms_opt(0, 0, 0)
      .ok_or_else(|| {
        anyhow!(
          "failed to construct \
           midnight for {token}"
        )
      })?;
    return Ok(midnight.and_utc());
  }

  Err(anyhow!(
    "supported formats: RFC3339, \
     YYYY-MM-DDTHH:MM[:SS][Z|±HH:MM], \
     YYYY-MM-DD HH:MM[:SS], YYYY-MM-DD, \
     YYYY-MM, YYYY"
  ))
  .with_context(|| {
    format!("unrecognized date: {raw}")
  })
}

fn parse_date_only(
  token: &str
) -> Option<NaiveDate> {
  if let Ok(date) =
    NaiveDate::parse_from_str(
      token, "%Y-%m-%d"
    )
  {
    return Some(date);
  }

  let padded = match token.len() {
    | 7 => format!("{token}-01"),
    | 4 if token
      .chars()
      .all(|ch| ch.is_ascii_digit()) =>
    {
      format!("{token}-01-01")
    }
    | _ => return None
  };
  NaiveDate::parse_from_str(
    &padded, "%Y-%m-%d"
  )
  .ok()
}

impl Event {
  /// Builds an event from a feed record. Unparseable dates are logged
  /// and treated as absent.
  #[must_use]
  pub fn from_record(
    record: EventRecord,
    zone: &DisplayZone
  ) -> Self {
    let start = resolve_field(
      &record.name,
      "start",
      record.start.as_deref(),
      zone
    );
    let end = resolve_field(
      &record.name,
      "end",
      record.end.as_deref(),
      zone
    );

    let frequency =
      Frequency::parse(&record.frequency);
    if matches!(
      frequency,
      Frequency::Unrecognized(_)
    ) {
      tracing::warn!(
        event = %record.name,
        %frequency,
        "unrecognized frequency; event will never match"
      );
    }

    Event::new(
      record.name,
      frequency,
      start,
      end
    )
  }
}

fn resolve_field(
  name: &str,
  field: &str,
  raw: Option<&str>,
  zone: &DisplayZone
) -> Option<NaiveDateTime> {
  let raw = raw?;
  if raw.trim().is_empty() {
    return None;
  }

  match parse_instant(raw, zone) {
    | Ok(instant) => {
      Some(zone.wall_clock(instant))
    }
    | Err(err) => {
      tracing::warn!(
        event = name,
        field,
        value = raw,
        error = %format!("{err:#}"),
        "ignoring unparseable event date"
      );
      None
    }
  }
}

#[must_use]
pub fn events_from_records(
  records: Vec<EventRecord>,
  zone: &DisplayZone
) -> Vec<Event> {
  records
    .into_iter()
    .map(|record| {
      Event::from_record(record, zone)
    })
    .collect()
}

/// Parses the whole feed body. Any JSON error fails the load.
#[tracing::instrument(skip(body, zone), fields(bytes = body.len()))]
pub fn parse_events(
  body: &str,
  zone: &DisplayZone
) -> anyhow::Result<Vec<Event>> {
  let records = serde_json::from_str::<
    Vec<EventRecord>
  >(body)
  .context("malformed events JSON")?;

  let events =
    events_from_records(records, zone);
  tracing::debug!(
    total = events.len(),
    "parsed events feed"
  );
  Ok(events)
}

/// The text shown in place of the calendar when loading fails.
#[must_use]
pub fn load_error_message(
  reason: &str
) -> String {
  let reason = reason.trim();
  if reason.is_empty() {
    format!("{LOAD_ERROR_PREFIX}.")
  } else {
    format!(
      "{LOAD_ERROR_PREFIX}: {reason}"
    )
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    NaiveDate,
    Timelike
  };

  use super::{
    EventRecord,
    load_error_message,
    parse_events,
    parse_instant
  };
  use crate::event::Frequency;
  use crate::zone::DisplayZone;

  fn berlin() -> DisplayZone {
    DisplayZone::Named(
      chrono_tz::Europe::Berlin
    )
  }

  #[test]
  fn offsetless_datetime_is_zone_wall_clock()
   {
    let zone = berlin();
    let instant = parse_instant(
      "2026-10-14T18:30",
      &zone
    )
    .expect("parse datetime");
    assert_eq!(instant.hour(), 16);
    assert_eq!(
      zone.wall_clock(instant).hour(),
      18
    );
  }

  #[test]
  fn explicit_offset_is_honoured() {
    let zone = berlin();
    let instant = parse_instant(
      "2026-10-14T18:30:00Z",
      &zone
    )
    .expect("parse rfc3339");
    assert_eq!(
      zone.wall_clock(instant).hour(),
      20
    );
  }

  #[test]
  fn bare_date_is_utc_midnight() {
    let new_york = DisplayZone::Named(
      chrono_tz::America::New_York
    );
    let instant =
      parse_instant("2026-10-14", &new_york)
        .expect("parse date");
    assert_eq!(
      instant.date_naive(),
      NaiveDate::from_ymd_opt(2026, 10, 14)
        .expect("valid date")
    );
    assert_eq!(
      new_york.wall_clock(instant).date(),
      NaiveDate::from_ymd_opt(2026, 10, 13)
        .expect("valid date")
    );
  }

  #[test]
  fn minute_precision_with_zulu_is_utc() {
    let instant = parse_instant(
      "2026-10-14T18:30Z",
      &berlin()
    )
    .expect("parse zulu minutes");
    assert_eq!(instant.hour(), 18);
    assert_eq!(instant.minute(), 30);
  }

  #[test]
  fn minute_precision_with_offset_is_honoured()
   {
    for raw in [
      "2026-10-14T18:30+02:00",
      "2026-10-14T18:30+0200"
    ] {
      let instant =
        parse_instant(raw, &berlin())
          .expect("parse offset minutes");
      assert_eq!(instant.hour(), 16, "{raw}");
    }

    let fractional = parse_instant(
      "2026-10-14T18:30:00.000Z",
      &berlin()
    )
    .expect("parse fractional zulu");
    assert_eq!(fractional.hour(), 18);
  }

  #[test]
  fn year_month_and_year_are_utc_first_day()
   {
    let month =
      parse_instant("2026-10", &berlin())
        .expect("parse year-month");
    assert_eq!(
      month.date_naive(),
      NaiveDate::from_ymd_opt(2026, 10, 1)
        .expect("valid date")
    );
    assert_eq!(month.hour(), 0);

    let year =
      parse_instant("2027", &berlin())
        .expect("parse year");
    assert_eq!(
      year.date_naive(),
      NaiveDate::from_ymd_opt(2027, 1, 1)
        .expect("valid date")
    );
  }

  #[test]
  fn rejects_garbage_naming_the_input_first()
   {
    let err = parse_instant(
      "next tuesday",
      &berlin()
    )
    .expect_err("should fail");
    let rendered = format!("{err:#}");
    assert!(
      rendered.starts_with(
        "unrecognized date: next tuesday: supported formats"
      ),
      "{rendered}"
    );
    assert!(
      parse_instant("2026-13", &berlin())
        .is_err()
    );
    assert!(
      parse_instant("20x6", &berlin())
        .is_err()
    );
  }

  #[test]
  fn parses_feed_with_nulls_and_missing_keys()
   {
    let body = r#"[
      {"name": "Standup", "frequency": "weekly", "start": "2026-10-07T09:00", "end": "2026-10-07T09:15"},
      {"name": "Ideas", "frequency": "once", "start": null, "end": null},
      {"name": "Broken", "frequency": "monthly", "start": "soon"},
      {"frequency": "fortnightly", "start": "2026-10-01T10:00"}
    ]"#;
    let events = parse_events(body, &berlin())
      .expect("parse feed");

    assert_eq!(events.len(), 4);
    assert_eq!(
      events[0].frequency,
      Frequency::Weekly
    );
    assert!(events[0].end.is_some());
    assert!(events[1].start.is_none());
    assert!(events[2].start.is_none());
    assert_eq!(events[3].name, "");
    assert_eq!(
      events[3].frequency.as_str(),
      "fortnightly"
    );
  }

  #[test]
  fn malformed_json_fails_whole_load() {
    let err = parse_events(
      r#"[{"name": "Oops""#,
      &berlin()
    )
    .expect_err("should fail");
    assert!(
      format!("{err:#}")
        .contains("malformed events JSON")
    );
  }

  #[test]
  fn record_defaults_are_empty() {
    let record: EventRecord =
      serde_json::from_str("{}")
        .expect("empty record");
    assert_eq!(record, EventRecord::default());
  }

  #[test]
  fn error_message_carries_reason() {
    assert_eq!(
      load_error_message(
        "Failed to fetch events.json (status 404)"
      ),
      "Could not load events: Failed to fetch events.json (status 404)"
    );
    assert_eq!(
      load_error_message(""),
      "Could not load events."
    );
  }
}
