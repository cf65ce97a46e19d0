use std::fs;

use chrono::NaiveDate;
use eventcal_core::cli::OutputFormat;
use eventcal_core::config::Config;
use eventcal_core::render_page;
use tempfile::tempdir;

const FEED: &str = r#"[
  {"name": "Standup", "frequency": "weekly", "start": "2026-09-02T09:00", "end": "2026-09-02T09:15"},
  {"name": "Rent", "frequency": "monthly", "start": "2026-01-31T08:00", "end": null},
  {"name": "Launch", "frequency": "once", "start": "2026-10-14T18:30", "end": "2026-10-14T20:00"},
  {"name": "Birthday", "frequency": "yearly", "start": "1990-10-17", "end": null},
  {"name": "Someday", "frequency": "weekly", "start": null, "end": null},
  {"name": "Daily", "frequency": "daily", "start": "2026-10-01T07:00", "end": null}
]"#;

fn names_by_day(html: &str) -> Vec<(u32, Vec<String>)> {
    html.split("<div class=\"calendar-day")
        .skip(1)
        .filter_map(|chunk| {
            let (_, rest) = chunk.split_once("<div class=\"date\">")?;
            let (day, rest) = rest.split_once("</div>")?;
            let names = rest
                .split("<strong>")
                .skip(1)
                .filter_map(|part| part.split_once("</strong>").map(|(name, _)| name.to_string()))
                .collect();
            Some((day.parse().ok()?, names))
        })
        .collect()
}

#[test]
fn renders_fixed_month_with_each_match_once_per_cell() {
    let temp = tempdir().expect("tempdir");
    fs::write(temp.path().join("events.json"), FEED).expect("write feed");
    let config_path = temp.path().join("eventcal.toml");
    fs::write(&config_path, "timezone = \"UTC\"\nweek_start = \"sunday\"\n").expect("write config");

    let cfg = Config::load(Some(config_path.as_path())).expect("load config");
    let feed = cfg.feed_path(None);
    assert_eq!(feed, temp.path().join("events.json"));

    let today = NaiveDate::from_ymd_opt(2026, 10, 17).expect("valid date");
    let html = render_page(&cfg.settings, &feed, today, OutputFormat::Html, false);

    assert_eq!(html.matches("<div class=\"calendar-day\"></div>").count(), 4);
    let days = names_by_day(&html);
    assert_eq!(days.len(), 31);

    for (day, names) in &days {
        let mut expected = Vec::new();
        if [7, 14, 21, 28].contains(day) {
            expected.push("Standup".to_string());
        }
        if *day == 31 {
            expected.push("Rent".to_string());
        }
        if *day == 14 {
            expected.push("Launch".to_string());
        }
        if *day == 17 {
            expected.push("Birthday".to_string());
        }
        assert_eq!(names, &expected, "day {day}");
    }

    assert!(html.contains("<strong>Launch</strong><br>18:30 – 20:00"));
    assert!(html.contains("<strong>Birthday</strong><br>00:00"));
    assert_eq!(html.matches("calendar-day today").count(), 1);
}

#[test]
fn short_month_drops_monthly_event_on_31st() {
    let temp = tempdir().expect("tempdir");
    let feed = temp.path().join("events.json");
    fs::write(&feed, FEED).expect("write feed");

    let mut cfg = Config::default();
    cfg.apply_timezone_override(Some("UTC".to_string()));

    let today = NaiveDate::from_ymd_opt(2026, 11, 3).expect("valid date");
    let html = render_page(&cfg.settings, &feed, today, OutputFormat::Html, false);
    assert!(!html.contains("<strong>Rent</strong>"));
    assert_eq!(names_by_day(&html).len(), 30);
}

#[test]
fn load_failures_replace_the_calendar() {
    let temp = tempdir().expect("tempdir");
    let cfg = Config::default();
    let today = NaiveDate::from_ymd_opt(2026, 10, 17).expect("valid date");

    let missing = render_page(
        &cfg.settings,
        &temp.path().join("absent.json"),
        today,
        OutputFormat::Html,
        false,
    );
    assert!(missing.starts_with("<div id=\"calendar\">\n  <p>Could not load events: failed to read"));
    assert!(!missing.contains("calendar-day"));

    let broken = temp.path().join("broken.json");
    fs::write(&broken, "[{\"name\": ").expect("write feed");
    let text = render_page(&cfg.settings, &broken, today, OutputFormat::Text, false);
    assert!(text.starts_with("Could not load events: failed to load"));
    assert!(text.contains("malformed events JSON"));
    assert_eq!(text.lines().count(), 1);
}
