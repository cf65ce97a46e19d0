use gloo::net::http::Request;

/// GETs `url` and returns the body. Non-2xx responses are errors.
pub async fn fetch_text(url: &str) -> Result<String, String> {
    tracing::info!(url, "fetching events feed");
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| format!("request error: {e}"))?;

    tracing::info!(
        status = response.status(),
        status_text = %response.status_text(),
        "fetch status"
    );

    if !response.ok() {
        return Err(format!(
            "Failed to fetch {url} (status {})",
            response.status()
        ));
    }

    response
        .text()
        .await
        .map_err(|e| format!("failed to read body: {e}"))
}
