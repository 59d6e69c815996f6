use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::response::{Html, IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use tokio::task;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::errors::LeafAreaError;
use crate::measurement::LeafMeasurements;
use crate::pipeline::{process_image, MeasureRequest};

#[derive(Clone)]
struct AppState {
    config: Config,
}

/// Build the application router. Exposed separately from `run` so tests can
/// drive it without binding a socket.
pub fn router(config: Config) -> Router {
    let body_limit = config.max_upload_bytes;
    let state = AppState { config };

    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/calculate", post(calculate))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process is stopped
pub async fn run(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let app = router(config);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn index() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

/// Raw multipart fields, collected before any validation runs
#[derive(Default)]
struct CalculateForm {
    length: Option<String>,
    width: Option<String>,
    fenestrated: bool,
    variegated: bool,
    image: Option<Vec<u8>>,
}

async fn read_form(mut multipart: Multipart) -> Result<CalculateForm, LeafAreaError> {
    let mut form = CalculateForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| LeafAreaError::Multipart(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "length" => {
                form.length = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| LeafAreaError::Multipart(e.to_string()))?,
                );
            }
            "width" => {
                form.width = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| LeafAreaError::Multipart(e.to_string()))?,
                );
            }
            // Presence of the field counts as true, whatever its value
            "fenestrated" => form.fenestrated = true,
            "variegated" => form.variegated = true,
            "image" => {
                form.image = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| LeafAreaError::Multipart(e.to_string()))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn calculate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<LeafMeasurements>, LeafAreaError> {
    let form = read_form(multipart).await?;

    // Dimensions are validated before the image is even looked at, so a
    // missing length never reaches the decoder.
    let length: f64 = form
        .length
        .as_deref()
        .and_then(|s| s.trim().parse().ok())
        .ok_or(LeafAreaError::InvalidDimensions)?;
    let width: f64 = form
        .width
        .as_deref()
        .and_then(|s| s.trim().parse().ok())
        .ok_or(LeafAreaError::InvalidDimensions)?;

    let bytes = form.image.ok_or(LeafAreaError::MissingImage)?;

    let request = MeasureRequest {
        length,
        width,
        fenestrated: form.fenestrated,
        variegated: form.variegated,
    };

    // The pipeline is synchronous CPU-bound work; keep it off the async workers.
    let config = state.config.clone();
    let result = task::spawn_blocking(move || process_image(&bytes, &request, &config))
        .await
        .map_err(|e| LeafAreaError::Other(e.to_string()))??;

    info!(
        leaf_area = result.leaf_area,
        fenestrated = request.fenestrated,
        variegated = request.variegated,
        "measurement complete"
    );

    Ok(Json(result))
}

static UPLOAD_FORM: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Leaf Area Calculator</title>
    <style>
      body { font-family: ui-sans-serif, system-ui, -apple-system, sans-serif;
             max-width: 480px; margin: 3rem auto; padding: 0 1rem; }
      label { display: block; margin-top: 1rem; }
      input[type="number"] { width: 8rem; }
      button { margin-top: 1.5rem; padding: 0.4rem 1.2rem; }
    </style>
  </head>
  <body>
    <h1>Leaf Area Calculator</h1>
    <p>Upload a photo of a leaf together with the real-world length and
       width of its bounding rectangle, in the same unit.</p>
    <form action="/calculate" method="post" enctype="multipart/form-data">
      <label>Length <input type="number" name="length" step="any" required /></label>
      <label>Width <input type="number" name="width" step="any" required /></label>
      <label><input type="checkbox" name="fenestrated" /> Fenestrated (has holes)</label>
      <label><input type="checkbox" name="variegated" /> Variegated (pale patches)</label>
      <label>Image <input type="file" name="image" accept="image/*" required /></label>
      <button type="submit">Calculate</button>
    </form>
  </body>
</html>"#;
