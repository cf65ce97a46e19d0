use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use eventcal_shared::CalendarSettings;
use tracing::{
  debug,
  info,
  warn
};

pub const CONFIG_FILE: &str =
  "eventcal.toml";
pub const CONFIG_ENV_VAR: &str =
  "EVENTCAL_CONFIG";

#[derive(Debug, Clone, Default)]
pub struct Config {
  pub settings:    CalendarSettings,
  pub loaded_file: Option<PathBuf>
}

impl Config {
  #[tracing::instrument(skip(
    override_path
  ))]
  pub fn load(
    override_path: Option<&Path>
  ) -> anyhow::Result<Self> {
    let Some(path) =
      resolve_config_path(override_path)?
    else {
      warn!(
        "no eventcal.toml found; using \
         defaults"
      );
      return Ok(Self::default());
    };

    info!(config = %path.display(), "loading config");
    let settings = load_file(&path)?;
    Ok(Self {
      settings,
      loaded_file: Some(path)
    })
  }

  /// A non-empty override replaces the configured zone.
  pub fn apply_timezone_override(
    &mut self,
    raw: Option<String>
  ) {
    let Some(raw) = raw else {
      return;
    };
    if raw.trim().is_empty() {
      return;
    }

    debug!(timezone = %raw, "applying timezone override");
    self.settings.timezone = Some(raw);
    self.settings.sanitize();
  }

  /// `--events` is taken as given; a relative `events` setting is
  /// resolved against the config file's directory.
  #[must_use]
  pub fn feed_path(
    &self,
    override_path: Option<&Path>
  ) -> PathBuf {
    if let Some(path) = override_path {
      return path.to_path_buf();
    }

    let configured =
      expand_tilde(Path::new(
        self.settings.events.trim()
      ));
    if configured.is_absolute() {
      return configured;
    }

    match self
      .loaded_file
      .as_deref()
      .and_then(Path::parent)
    {
      | Some(base)
        if !base.as_os_str().is_empty() =>
      {
        base.join(configured)
      }
      | _ => configured
    }
  }
}

#[tracing::instrument]
fn load_file(
  path: &Path
) -> anyhow::Result<CalendarSettings> {
  let text = fs::read_to_string(path)
    .with_context(|| {
      format!(
        "failed to read {}",
        path.display()
      )
    })?;

  let mut settings =
    toml::from_str::<CalendarSettings>(
      &text
    )
    .with_context(|| {
      format!(
        "failed to parse {}",
        path.display()
      )
    })?;
  settings.sanitize();

  debug!(
    timezone = ?settings.timezone,
    week_start = %settings.week_start,
    events = %settings.events,
    "loaded calendar settings"
  );
  Ok(settings)
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_config_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    let path = expand_tilde(path);
    if !path.exists() {
      return Err(anyhow!(
        "config file does not exist: \
         {}",
        path.display()
      ));
    }
    return Ok(Some(path));
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if trimmed == "/dev/null" {
      return Ok(None);
    }
    if !trimmed.is_empty() {
      return Ok(Some(expand_tilde(
        Path::new(trimmed)
      )));
    }
  }

  let local = PathBuf::from(CONFIG_FILE);
  if local.exists() {
    return Ok(Some(local));
  }

  let user = dirs::config_dir().map(
    |dir| {
      dir.join("eventcal").join(
        CONFIG_FILE
      )
    }
  );
  Ok(user.filter(|path| path.exists()))
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}
