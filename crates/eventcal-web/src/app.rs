use chrono::Utc;
use eventcal_shared::{
  CalendarSettings,
  DayCell,
  MonthGrid,
  load_error_message,
  parse_events
};
use yew::{
  Html,
  Properties,
  classes,
  function_component,
  html,
  use_effect_with,
  use_state
};

use crate::api::fetch_text;

const CALENDAR_CONFIG_TOML: &str =
  include_str!("../assets/calendar.toml");

#[derive(Clone, PartialEq)]
enum LoadState {
  Loading,
  Loaded(MonthGrid),
  Failed(String)
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
  pub settings: CalendarSettings
}

pub fn load_calendar_settings()
-> CalendarSettings {
  match toml::from_str::<CalendarSettings>(
    CALENDAR_CONFIG_TOML
  ) {
    | Ok(mut settings) => {
      settings.sanitize();
      tracing::info!(
        timezone = ?settings.timezone,
        week_start = %settings.week_start,
        events = %settings.events,
        "loaded calendar settings"
      );
      settings
    }
    | Err(error) => {
      tracing::error!(%error, "failed parsing calendar settings; using defaults");
      CalendarSettings::default()
    }
  }
}

async fn load_month(
  settings: &CalendarSettings
) -> Result<MonthGrid, String> {
  let body =
    fetch_text(&settings.events).await?;
  let zone = settings.zone();
  let events = parse_events(&body, &zone)
    .map_err(|err| format!("{err:#}"))?;
  tracing::info!(
    total = events.len(),
    "events loaded"
  );

  let today = zone.today(Utc::now());
  Ok(MonthGrid::build(
    today,
    settings.week_start_day(),
    &events,
    &settings.time_format
  ))
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
  let state =
    use_state(|| LoadState::Loading);

  {
    let state = state.clone();
    let settings = props.settings.clone();
    use_effect_with((), move |_| {
      wasm_bindgen_futures::spawn_local(
        async move {
          match load_month(&settings).await
          {
            | Ok(grid) => {
              state.set(LoadState::Loaded(
                grid
              ))
            }
            | Err(err) => {
              tracing::error!(error = %err, "failed to load events");
              state.set(LoadState::Failed(
                load_error_message(&err)
              ));
            }
          }
        }
      );
      || ()
    });
  }

  match &*state {
    | LoadState::Loading => html! {},
    | LoadState::Loaded(grid) => {
      render_month(grid)
    }
    | LoadState::Failed(message) => {
      html! { <p>{ message.clone() }</p> }
    }
  }
}

fn render_month(grid: &MonthGrid) -> Html {
  html! {
      <>
          {
              for (0..grid.leading_blanks).map(|_| html! {
                  <div class="calendar-day"></div>
              })
          }
          { for grid.days.iter().map(render_day_cell) }
      </>
  }
}

fn render_day_cell(cell: &DayCell) -> Html {
  html! {
      <div class={classes!("calendar-day", cell.is_today.then_some("today"))}>
          <div class="date">{ cell.day() }</div>
          {
              for cell.events.iter().map(|event| html! {
                  <div class="event">
                      <strong>{ event.name.clone() }</strong>
                      <br />
                      { event.time_label.clone() }
                  </div>
              })
          }
      </div>
  }
}
