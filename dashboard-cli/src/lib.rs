//! HTTP surface for the dashboard renderer.
//!
//! `GET /` renders a page from its query string, `GET /healthz` is a liveness check.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
};
use chrono::Utc;
use dashboard_core::{Config, PageKind, RawParams, WeatherProvider, render_page};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,dashboard_core=debug,dashboard_cli=debug";

/// Shared, read-only state for every request.
pub struct AppState {
    pub provider: Arc<dyn WeatherProvider>,
    pub config: Config,
}

pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP status for a rendered page; error pages still carry an HTML body.
pub fn status_for(kind: PageKind) -> StatusCode {
    match kind {
        PageKind::Dashboard | PageKind::Debug => StatusCode::OK,
        PageKind::RequestError => StatusCode::BAD_REQUEST,
        PageKind::UpstreamError => StatusCode::BAD_GATEWAY,
    }
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    let raw = RawParams::from_pairs(pairs);
    let page = render_page(state.provider.as_ref(), &raw, &state.config, Utc::now()).await;
    (status_for(page.kind), Html(page.html))
}

async fn healthz() -> &'static str {
    "ok"
}

/// Install the global subscriber: `RUST_LOG` or [`DEFAULT_LOG_FILTER`], logs on stderr.
pub fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}
