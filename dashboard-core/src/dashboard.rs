//! One request, start to finish: resolve parameters, fetch, derive, render.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::{
    config::Config,
    daily::{aggregate_days, summarize_now},
    error::DashboardError,
    hourly::interpolate_hours,
    model::WeatherSnapshot,
    params::{DisplayMode, RawParams, RequestConfig},
    provider::WeatherProvider,
    render::{ForecastCard, render_dashboard, render_debug, render_error},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Dashboard,
    Debug,
    /// The caller's parameters could not be used; nothing was fetched.
    RequestError,
    /// OpenWeather failed or answered with something unusable.
    UpstreamError,
}

/// A finished HTML document and what kind of page it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub kind: PageKind,
    pub html: String,
}

impl RenderedPage {
    fn error(request: &RequestConfig, err: &DashboardError) -> Self {
        let kind = if err.is_request_error() {
            PageKind::RequestError
        } else {
            PageKind::UpstreamError
        };
        Self {
            kind,
            html: render_error(request.width, request.height, &err.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, PageKind::RequestError | PageKind::UpstreamError)
    }
}

/// Forecast row for the request's display mode.
pub fn forecast_cards(
    request: &RequestConfig,
    snapshot: &WeatherSnapshot,
    now: DateTime<Utc>,
) -> Vec<ForecastCard> {
    let offset = snapshot.current.utc_offset_secs;
    match request.mode {
        DisplayMode::Daily { days } => aggregate_days(&snapshot.forecast, offset, now, days)
            .iter()
            .map(ForecastCard::from)
            .collect(),
        DisplayMode::Hourly { hours, step_minutes } => {
            interpolate_hours(&snapshot.forecast, offset, now, hours, step_minutes)
                .iter()
                .map(ForecastCard::from)
                .collect()
        }
    }
}

/// Render fetched weather as a dashboard, or as the debug dump when asked for.
pub fn render_snapshot(
    request: &RequestConfig,
    snapshot: &WeatherSnapshot,
    now: DateTime<Utc>,
) -> RenderedPage {
    if request.debug {
        return RenderedPage {
            kind: PageKind::Debug,
            html: render_debug(snapshot, now),
        };
    }

    let summary = summarize_now(&snapshot.forecast, &snapshot.current, now);
    let cards = forecast_cards(request, snapshot, now);
    RenderedPage {
        kind: PageKind::Dashboard,
        html: render_dashboard(request, &snapshot.current, &summary, &cards),
    }
}

/// Handle one dashboard request.
///
/// Never fails: every error becomes an error page sized to the requested display.
pub async fn render_page(
    provider: &dyn WeatherProvider,
    raw: &RawParams,
    config: &Config,
    now: DateTime<Utc>,
) -> RenderedPage {
    let request = RequestConfig::from_params(raw, config);
    debug!(
        width = request.width,
        height = request.height,
        mode = ?request.mode,
        mono = request.theme.mono,
        source = ?request.location_source(),
        "resolved dashboard request"
    );

    let (api_key, location) = match request.credentials() {
        Ok(creds) => creds,
        Err(err) => {
            warn!(error = %err, "rejecting dashboard request");
            return RenderedPage::error(&request, &err);
        }
    };

    match provider.fetch(location, api_key).await {
        Ok(snapshot) => {
            debug!(
                location = %snapshot.current.location_name,
                points = snapshot.forecast.len(),
                "fetched weather"
            );
            render_snapshot(&request, &snapshot, now)
        }
        Err(err) => {
            warn!(error = %err, %location, "weather fetch failed");
            RenderedPage::error(&request, &err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{CurrentConditions, ForecastPoint},
        params::{ApiKey, Location},
    };
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    #[derive(Debug, Default)]
    struct FakeProvider {
        snapshot: WeatherSnapshot,
        fail: bool,
        calls: AtomicUsize,
        seen: Mutex<Option<Location>>,
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn fetch(
            &self,
            location: &Location,
            _api_key: &ApiKey,
        ) -> Result<WeatherSnapshot, DashboardError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen.lock().unwrap() = Some(location.clone());
            if self.fail {
                return Err(DashboardError::Upstream("city not found".into()));
            }
            Ok(self.snapshot.clone())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 14, 0, 0).unwrap()
    }

    fn rainy_tomorrow() -> WeatherSnapshot {
        WeatherSnapshot {
            current: CurrentConditions {
                location_name: "Springfield".into(),
                temperature_f: 48.0,
                icon: "04d".into(),
                main: "Clouds".into(),
                description: "broken clouds".into(),
                ..Default::default()
            },
            forecast: vec![ForecastPoint {
                ts: Utc.with_ymd_and_hms(2024, 3, 11, 12, 0, 0).unwrap().timestamp(),
                temperature_f: 50.0,
                icon: "10d".into(),
                description: "light rain".into(),
                rain_3h_mm: 3.0,
                pop: 0.5,
                ..Default::default()
            }],
        }
    }

    fn params(pairs: &[(&str, &str)]) -> RawParams {
        RawParams::from_pairs(pairs.iter().copied())
    }

    #[tokio::test]
    async fn missing_key_is_rejected_before_fetching() {
        let provider = FakeProvider::default();
        let page = render_page(&provider, &params(&[("res", "400x240"), ("q", "London")]), &Config::default(), now()).await;

        assert_eq!(page.kind, PageKind::RequestError);
        assert!(page.is_error());
        assert!(page.html.contains("width:400px;height:240px;"));
        assert!(page.html.contains("Error: missing or invalid apikey"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_location_is_rejected() {
        let provider = FakeProvider::default();
        let page = render_page(&provider, &params(&[("apikey", KEY)]), &Config::default(), now()).await;
        assert_eq!(page.kind, PageKind::RequestError);
        assert!(page.html.contains("no location given"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn configured_default_location_is_used_and_labelled() {
        let provider = FakeProvider { snapshot: rainy_tomorrow(), ..Default::default() };
        let config = Config {
            default_location: Some(Location::CityId { id: 4_500_000 }),
            ..Config::default()
        };
        let page = render_page(&provider, &params(&[("apikey", KEY)]), &config, now()).await;

        assert_eq!(page.kind, PageKind::Dashboard);
        assert_eq!(*provider.seen.lock().unwrap(), Some(Location::CityId { id: 4_500_000 }));
        assert!(page.html.contains("<div class=\"corner-label\">Springfield</div>"));
    }

    #[tokio::test]
    async fn upstream_errors_become_error_pages() {
        let provider = FakeProvider { fail: true, ..Default::default() };
        let page = render_page(&provider, &params(&[("apikey", KEY), ("q", "Nowhere")]), &Config::default(), now()).await;
        assert_eq!(page.kind, PageKind::UpstreamError);
        assert!(page.html.ends_with("<body>Error: city not found</body></html>"));
    }

    #[tokio::test]
    async fn single_rainy_point_renders_one_rainy_day() {
        let provider = FakeProvider { snapshot: rainy_tomorrow(), ..Default::default() };
        let raw = params(&[("apikey", KEY), ("q", "Springfield"), ("dcount", "1")]);
        let request = RequestConfig::from_params(&raw, &Config::default());

        let cards = forecast_cards(&request, &provider.snapshot, now());
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "Mon");
        assert_eq!(cards[0].precip_type, crate::model::PrecipType::Rain);
        assert!((cards[0].precip_in - 0.118).abs() < 0.001);
        assert_eq!(cards[0].pop_pct, 50);

        let page = render_page(&provider, &raw, &Config::default(), now()).await;
        assert_eq!(page.kind, PageKind::Dashboard);
        assert!(page.html.contains("0.12in 50%"));
    }

    #[tokio::test]
    async fn resolution_scales_the_base_layout() {
        let provider = FakeProvider { snapshot: rainy_tomorrow(), ..Default::default() };
        let raw = params(&[("apikey", KEY), ("q", "Springfield"), ("res", "400x240")]);
        let page = render_page(&provider, &raw, &Config::default(), now()).await;
        assert!(page.html.contains("width: 400px;"));
        assert!(page.html.contains("height: 240px;"));
        assert!(page.html.contains("width: 800px;"));
        assert!(page.html.contains("height: 480px;"));
        assert!(page.html.contains("transform: scale(0.5);"));
    }

    #[tokio::test]
    async fn mono_paints_icons_with_foreground() {
        let provider = FakeProvider { snapshot: rainy_tomorrow(), ..Default::default() };
        let raw = params(&[
            ("apikey", KEY),
            ("q", "Springfield"),
            ("mono", "1"),
            ("fg", "eee"),
            ("cloud", "#123456"),
            ("rain", "00ff00"),
            ("sun2", "f0f"),
        ]);
        let page = render_page(&provider, &raw, &Config::default(), now()).await;
        assert!(page.html.contains("--sun2:#EEEEEE;--cloud:#EEEEEE;--rain:#EEEEEE;"));
        assert!(!page.html.contains("#123456"));
        assert!(!page.html.contains("#00FF00"));
        assert!(!page.html.contains("#FF00FF"));
    }

    #[tokio::test]
    async fn hourly_mode_uses_time_labels() {
        let provider = FakeProvider { snapshot: rainy_tomorrow(), ..Default::default() };
        let raw = params(&[("apikey", KEY), ("q", "Springfield"), ("mode", "hourly"), ("hcount", "2")]);
        let page = render_page(&provider, &raw, &Config::default(), now()).await;
        assert!(page.html.contains("<div class=\"day-name\">3:00pm</div>"));
        assert!(page.html.contains("<div class=\"day-name\">4:00pm</div>"));
        assert_eq!(page.html.matches("class=\"day-name\"").count(), 2);
    }

    #[tokio::test]
    async fn debug_dump_bypasses_the_dashboard() {
        let provider = FakeProvider { snapshot: rainy_tomorrow(), ..Default::default() };
        let raw = params(&[("apikey", KEY), ("q", "Springfield"), ("debug", "true")]);
        let page = render_page(&provider, &raw, &Config::default(), now()).await;
        assert_eq!(page.kind, PageKind::Debug);
        assert!(page.html.starts_with("<pre"));
        assert!(page.html.contains("- Mon 12:00pm | light rain (10d)"));
    }
}
