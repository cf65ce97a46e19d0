mod api;
mod app;

fn main() {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  let settings =
    app::load_calendar_settings();
  tracing::info!(
    container = %settings.container_id,
    "starting eventcal frontend"
  );

  let Some(mount) = web_sys::window()
    .and_then(|window| {
      window.document()
    })
    .and_then(|document| {
      document.get_element_by_id(
        &settings.container_id
      )
    })
  else {
    tracing::warn!(
      container = %settings.container_id,
      "calendar container not found; nothing to render"
    );
    return;
  };

  mount.set_inner_html("");
  yew::Renderer::<app::App>::with_root_and_props(
    mount,
    app::AppProps { settings }
  )
  .render();
}
