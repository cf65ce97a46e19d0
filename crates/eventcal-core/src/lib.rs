pub mod cli;
pub mod config;
pub mod render;

use std::ffi::OsString;
use std::fs;
use std::io::{
  self,
  IsTerminal,
  Write
};
use std::path::Path;

use anyhow::Context;
use chrono::{
  NaiveDate,
  Utc
};
use clap::Parser;
use eventcal_shared::{
  CalendarSettings,
  DisplayZone,
  Event,
  MonthGrid,
  load_error_message,
  parse_events
};
use tracing::{
  debug,
  error,
  info
};

use crate::cli::OutputFormat;

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet,
    cli.no_color
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting eventcal"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_timezone_override(
    cli.timezone
  );

  let zone = cfg.settings.zone();
  let today = cli.today.unwrap_or_else(
    || zone.today(Utc::now())
  );
  let feed = cfg
    .feed_path(cli.events.as_deref());
  debug!(
    %zone,
    %today,
    feed = %feed.display(),
    "resolved render inputs"
  );

  let color = !cli.no_color
    && cli.output.is_none()
    && io::stdout().is_terminal();
  let page = render_page(
    &cfg.settings,
    &feed,
    today,
    cli.format,
    color
  );

  match cli.output.as_deref() {
    | Some(path) => {
      fs::write(path, page)
        .with_context(|| {
          format!(
            "failed to write {}",
            path.display()
          )
        })?;
      info!(output = %path.display(), "wrote calendar");
    }
    | None => {
      let mut out = io::stdout().lock();
      out
        .write_all(page.as_bytes())
        .context(
          "failed to write calendar to \
           stdout"
        )?;
    }
  }

  info!("done");
  Ok(())
}

/// Reads and parses the events feed.
#[tracing::instrument(skip(zone), fields(zone = %zone))]
pub fn load_events(
  path: &Path,
  zone: &DisplayZone
) -> anyhow::Result<Vec<Event>> {
  let body = fs::read_to_string(path)
    .with_context(|| {
      format!(
        "failed to read {}",
        path.display()
      )
    })?;

  let events = parse_events(&body, zone)
    .with_context(|| {
      format!(
        "failed to load {}",
        path.display()
      )
    })?;
  info!(
    total = events.len(),
    "loaded events"
  );
  Ok(events)
}

/// Renders the month containing `today`, or the load failure message
/// in its place. Never partially renders.
#[tracing::instrument(skip(settings, color))]
pub fn render_page(
  settings: &CalendarSettings,
  feed: &Path,
  today: NaiveDate,
  format: OutputFormat,
  color: bool
) -> String {
  let zone = settings.zone();

  match load_events(feed, &zone) {
    | Ok(events) => {
      let grid = MonthGrid::build(
        today,
        settings.week_start_day(),
        &events,
        &settings.time_format
      );
      match format {
        | OutputFormat::Html => {
          render::render_html(
            &grid,
            &settings.container_id
          )
        }
        | OutputFormat::Text => {
          render::Renderer::new(color)
            .render_text(&grid)
        }
      }
    }
    | Err(err) => {
      let reason = format!("{err:#}");
      error!(error = %reason, "failed to load events");
      let message =
        load_error_message(&reason);
      match format {
        | OutputFormat::Html => {
          render::render_error_html(
            &settings.container_id,
            &message
          )
        }
        | OutputFormat::Text => {
          format!("{message}\n")
        }
      }
    }
  }
}
