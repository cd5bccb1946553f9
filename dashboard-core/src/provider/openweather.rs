use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::DEFAULT_OPENWEATHER_BASE_URL,
    error::DashboardError,
    model::{CurrentConditions, ForecastPoint, WeatherSnapshot},
    params::{ApiKey, Location},
    precip::hourly_rate_mm,
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    base_url: String,
    http: Client,
}

impl Default for OpenWeatherProvider {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_OPENWEATHER_BASE_URL)
    }
}

impl OpenWeatherProvider {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// GET one endpoint and return its JSON body once `cod` says it succeeded.
    async fn get_json(
        &self,
        path: &str,
        what: &'static str,
        location: &Location,
        api_key: &ApiKey,
    ) -> Result<Value, DashboardError> {
        let url = format!("{}{}", self.base_url, path);

        let mut query = location.query_pairs();
        query.push(("appid", api_key.as_str().to_string()));
        query.push(("units", "imperial".to_string()));

        debug!(%url, %location, "requesting OpenWeather {what}");

        let res = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|source| {
                warn!(error = %source, "OpenWeather {what} request failed");
                DashboardError::Transport { what, source }
            })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| DashboardError::Transport { what, source })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %truncate_body(&body), "OpenWeather {what} returned an error status");
            // OpenWeather explains most failures (bad key, unknown city) in a JSON body.
            if let Ok(value) = serde_json::from_str::<Value>(&body) {
                check_cod(&value)?;
            }
            return Err(DashboardError::Status { what, status: status.as_u16() });
        }

        let value: Value = serde_json::from_str(&body).map_err(|err| {
            warn!(error = %err, body = %truncate_body(&body), "OpenWeather {what} is not JSON");
            DashboardError::InvalidJson
        })?;
        check_cod(&value)?;

        Ok(value)
    }

    async fn fetch_current(
        &self,
        location: &Location,
        api_key: &ApiKey,
    ) -> Result<CurrentConditions, DashboardError> {
        let value = self.get_json("/data/2.5/weather", "current weather", location, api_key).await?;
        parse_current(value)
    }

    async fn fetch_forecast(
        &self,
        location: &Location,
        api_key: &ApiKey,
    ) -> Result<Vec<ForecastPoint>, DashboardError> {
        let value = self.get_json("/data/2.5/forecast", "forecast", location, api_key).await?;
        parse_forecast(&value)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(
        &self,
        location: &Location,
        api_key: &ApiKey,
    ) -> Result<WeatherSnapshot, DashboardError> {
        let (current, forecast) = tokio::try_join!(
            self.fetch_current(location, api_key),
            self.fetch_forecast(location, api_key),
        )?;

        debug!(
            location = %current.location_name,
            points = forecast.len(),
            "fetched OpenWeather snapshot"
        );
        Ok(WeatherSnapshot { current, forecast })
    }
}

/// A `cod` other than 200 is an error reported by OpenWeather itself.
pub(crate) fn check_cod(value: &Value) -> Result<(), DashboardError> {
    let Some(obj) = value.as_object() else {
        return Err(DashboardError::InvalidJson);
    };

    let cod = match obj.get("cod") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    if !cod.is_empty() && cod != "200" {
        let message = match obj.get("message") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "Unknown OpenWeather error.".to_string(),
            Some(other) => other.to_string(),
        };
        return Err(DashboardError::Upstream(message));
    }
    Ok(())
}

pub(crate) fn parse_current(value: Value) -> Result<CurrentConditions, DashboardError> {
    let parsed: OwCurrentResponse =
        serde_json::from_value(value).map_err(|_| DashboardError::MissingFields)?;

    let weather = parsed.weather.into_iter().next().unwrap_or_default();
    let main = parsed.main.unwrap_or_default();
    let (Some(icon), Some(temperature_f)) = (weather.icon, main.temp) else {
        return Err(DashboardError::MissingFields);
    };

    let rain = parsed.rain.unwrap_or_default();
    let snow = parsed.snow.unwrap_or_default();

    Ok(CurrentConditions {
        location_name: parsed.name.unwrap_or_default(),
        utc_offset_secs: parsed.timezone.and_then(|tz| i32::try_from(tz).ok()).unwrap_or(0),
        observed_at: parsed.dt.and_then(|dt| DateTime::from_timestamp(dt, 0)),
        temperature_f,
        feels_like_f: main.feels_like.unwrap_or(temperature_f),
        humidity_pct: main.humidity.unwrap_or(0.0),
        wind_speed_mph: parsed.wind.and_then(|w| w.speed).unwrap_or(0.0),
        icon,
        main: weather.main.unwrap_or_default(),
        description: weather.description.unwrap_or_default(),
        rain_rate_mm_hr: hourly_rate_mm(rain.one_hour, rain.three_hours),
        snow_rate_mm_hr: hourly_rate_mm(snow.one_hour, snow.three_hours),
    })
}

/// Forecast entries are read leniently; only a missing `list` is fatal.
///
/// A malformed value degrades to zero on its own. Entries without a usable
/// `dt` cannot be placed in time and are skipped.
pub(crate) fn parse_forecast(value: &Value) -> Result<Vec<ForecastPoint>, DashboardError> {
    let list = value
        .get("list")
        .and_then(Value::as_array)
        .ok_or(DashboardError::MissingFields)?;

    Ok(list
        .iter()
        .filter_map(|item| serde_json::from_value::<OwForecastEntry>(item.clone()).ok())
        .filter_map(OwForecastEntry::into_point)
        .collect())
}

/// Deserialize a field, falling back to its default when the value has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwMain {
    #[serde(deserialize_with = "lenient")]
    temp: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    feels_like: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    humidity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwWeather {
    #[serde(deserialize_with = "lenient")]
    main: Option<String>,
    #[serde(deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwWind {
    #[serde(deserialize_with = "lenient")]
    speed: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwPrecip {
    #[serde(rename = "1h", deserialize_with = "lenient")]
    one_hour: Option<f64>,
    #[serde(rename = "3h", deserialize_with = "lenient")]
    three_hours: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwCurrentResponse {
    #[serde(deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    dt: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    timezone: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    main: Option<OwMain>,
    #[serde(deserialize_with = "lenient")]
    weather: Vec<OwWeather>,
    #[serde(deserialize_with = "lenient")]
    wind: Option<OwWind>,
    #[serde(deserialize_with = "lenient")]
    rain: Option<OwPrecip>,
    #[serde(deserialize_with = "lenient")]
    snow: Option<OwPrecip>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwForecastEntry {
    #[serde(deserialize_with = "lenient")]
    dt: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    main: Option<OwMain>,
    #[serde(deserialize_with = "lenient")]
    weather: Vec<OwWeather>,
    #[serde(deserialize_with = "lenient")]
    rain: Option<OwPrecip>,
    #[serde(deserialize_with = "lenient")]
    snow: Option<OwPrecip>,
    #[serde(deserialize_with = "lenient")]
    pop: Option<f64>,
}

impl OwForecastEntry {
    fn into_point(self) -> Option<ForecastPoint> {
        let ts = self.dt?;
        let weather = self.weather.into_iter().next().unwrap_or_default();
        Some(ForecastPoint {
            ts,
            temperature_f: self.main.and_then(|m| m.temp).unwrap_or(0.0),
            icon: weather.icon.unwrap_or_default(),
            description: weather.description.unwrap_or_default(),
            rain_3h_mm: self.rain.and_then(|r| r.three_hours).unwrap_or(0.0).max(0.0),
            snow_3h_mm: self.snow.and_then(|s| s.three_hours).unwrap_or(0.0).max(0.0),
            pop: self.pop.unwrap_or(0.0).clamp(0.0, 1.0),
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
