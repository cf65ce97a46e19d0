use chrono::format::{
  Item,
  StrftimeItems
};
use serde::Deserialize;

use crate::event::DEFAULT_TIME_FORMAT;
use crate::feed::DEFAULT_FEED;
use crate::grid::WeekStart;
use crate::zone::DisplayZone;

pub const DEFAULT_CONTAINER_ID: &str =
  "calendar";

fn settings_default_week_start()
-> String {
  "sunday".to_string()
}

fn settings_default_time_format()
-> String {
  DEFAULT_TIME_FORMAT.to_string()
}

fn settings_default_events() -> String {
  DEFAULT_FEED.to_string()
}

fn settings_default_container_id()
-> String {
  DEFAULT_CONTAINER_ID.to_string()
}

/// Calendar settings shared by the CLI (`eventcal.toml`) and the web
/// frontend (embedded `calendar.toml`).
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Deserialize,
)]
pub struct CalendarSettings {
  #[serde(default)]
  pub timezone:     Option<String>,
  #[serde(
    default = "settings_default_week_start"
  )]
  pub week_start:   String,
  #[serde(
    default = "settings_default_time_format"
  )]
  pub time_format:  String,
  #[serde(
    default = "settings_default_events"
  )]
  pub events:       String,
  #[serde(
    default = "settings_default_container_id"
  )]
  pub container_id: String
}

impl Default for CalendarSettings {
  fn default() -> Self {
    Self {
      timezone:     None,
      week_start:
        settings_default_week_start(),
      time_format:
        settings_default_time_format(),
      events:       settings_default_events(
      ),
      container_id:
        settings_default_container_id()
    }
  }
}

impl CalendarSettings {
  /// Resets blank or invalid values to their defaults.
  pub fn sanitize(&mut self) {
    if self
      .timezone
      .as_deref()
      .is_some_and(|tz| {
        tz.trim().is_empty()
      })
    {
      self.timezone = None;
    }

    if let Some(raw) =
      self.timezone.as_deref()
      && let Err(err) =
        DisplayZone::parse(raw)
    {
      tracing::warn!(
        timezone = %raw,
        error = %err,
        "invalid timezone; using local time"
      );
      self.timezone = None;
    }

    let week_start =
      self.week_start.trim().to_ascii_lowercase();
    if week_start != "sunday"
      && week_start != "monday"
    {
      tracing::warn!(
        week_start = %self.week_start,
        "unknown week start; using sunday"
      );
      self.week_start =
        settings_default_week_start();
    } else {
      self.week_start = week_start;
    }

    if !is_valid_time_format(
      &self.time_format
    ) {
      tracing::warn!(
        time_format = %self.time_format,
        "invalid time format; using default"
      );
      self.time_format =
        settings_default_time_format();
    }

    if self.events.trim().is_empty() {
      self.events =
        settings_default_events();
    }

    if self
      .container_id
      .trim()
      .is_empty()
    {
      self.container_id =
        settings_default_container_id();
    }
  }

  #[must_use]
  pub fn zone(&self) -> DisplayZone {
    self
      .timezone
      .as_deref()
      .and_then(|raw| {
        DisplayZone::parse(raw).ok()
      })
      .unwrap_or_default()
  }

  #[must_use]
  pub fn week_start_day(
    &self
  ) -> WeekStart {
    WeekStart::from_setting(
      &self.week_start
    )
  }
}

#[must_use]
pub fn is_valid_time_format(
  fmt: &str
) -> bool {
  !fmt.trim().is_empty()
    && StrftimeItems::new(fmt)
      .all(|item| {
        !matches!(item, Item::Error)
      })
}

#[cfg(test)]
mod tests {
  use super::{
    CalendarSettings,
    is_valid_time_format
  };
  use crate::grid::WeekStart;
  use crate::zone::DisplayZone;

  #[test]
  fn empty_toml_yields_defaults() {
    let settings: CalendarSettings =
      toml::from_str("")
        .expect("parse empty");
    assert_eq!(
      settings,
      CalendarSettings::default()
    );
    assert_eq!(settings.events, "events.json");
    assert_eq!(settings.container_id, "calendar");
    assert_eq!(
      settings.zone(),
      DisplayZone::Local
    );
  }

  #[test]
  fn sanitize_restores_bad_values() {
    let mut settings: CalendarSettings =
      toml::from_str(
        r#"
timezone = "Nowhere/Special"
week_start = "Thursday"
time_format = "%Q"
events = "  "
container_id = ""
"#
      )
      .expect("parse settings");
    settings.sanitize();
    assert_eq!(
      settings,
      CalendarSettings::default()
    );
  }

  #[test]
  fn sanitize_keeps_good_values() {
    let mut settings: CalendarSettings =
      toml::from_str(
        r#"
timezone = "Europe/Lisbon"
week_start = "MONDAY"
time_format = "%I:%M %p"
"#
      )
      .expect("parse settings");
    settings.sanitize();
    assert_eq!(
      settings.zone(),
      DisplayZone::Named(
        chrono_tz::Europe::Lisbon
      )
    );
    assert_eq!(
      settings.week_start_day(),
      WeekStart::Monday
    );
    assert_eq!(settings.time_format, "%I:%M %p");
  }

  #[test]
  fn validates_strftime_strings() {
    assert!(is_valid_time_format("%H:%M"));
    assert!(!is_valid_time_format("%Q"));
    assert!(!is_valid_time_format(""));
  }
}
