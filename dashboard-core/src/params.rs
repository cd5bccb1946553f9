//! Request parameter resolution.
//!
//! Raw query values are untrusted strings. Anything with a safe default is
//! normalized silently; only a missing API key or location becomes an error,
//! and only once [`RequestConfig::credentials`] is asked for them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::DashboardError,
    theme::{PaletteOverrides, Theme},
};

pub const BASE_WIDTH: u32 = 800;
pub const BASE_HEIGHT: u32 = 480;

pub const DEFAULT_DAILY_COUNT: usize = 5;
pub const DEFAULT_HOURLY_COUNT: usize = 5;
pub const DEFAULT_HOURLY_STEP_MINUTES: u32 = 60;

const MAX_DAILY_COUNT: usize = 7;
const MAX_HOURLY_COUNT: usize = 48;
const MAX_HOURLY_STEP_MINUTES: u32 = 1440;

/// Raw query parameters, exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams {
    pub res: Option<String>,
    pub w: Option<String>,
    pub h: Option<String>,
    pub apikey: Option<String>,
    pub mono: Option<String>,
    pub scheme: Option<String>,
    pub hourly: Option<String>,
    pub mode: Option<String>,
    pub cityid: Option<String>,
    pub q: Option<String>,
    pub debug: Option<String>,
    pub label: Option<String>,
    pub autoloc: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub zip: Option<String>,
    pub zipcountry: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub hcount: Option<String>,
    pub hstep: Option<String>,
    pub dcount: Option<String>,
    pub colors: PaletteOverrides,
}

impl RawParams {
    /// Build from decoded query pairs. Unknown keys are ignored; a repeated key keeps its last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut raw = RawParams::default();
        for (key, value) in pairs {
            let value = Some(value.into());
            let slot = match key.as_ref() {
                "res" => &mut raw.res,
                "w" => &mut raw.w,
                "h" => &mut raw.h,
                "apikey" => &mut raw.apikey,
                "mono" => &mut raw.mono,
                "scheme" => &mut raw.scheme,
                "hourly" => &mut raw.hourly,
                "mode" => &mut raw.mode,
                "cityid" => &mut raw.cityid,
                "q" => &mut raw.q,
                "debug" => &mut raw.debug,
                "label" => &mut raw.label,
                "autoloc" => &mut raw.autoloc,
                "lat" => &mut raw.lat,
                "lon" => &mut raw.lon,
                "zip" => &mut raw.zip,
                "zipcountry" => &mut raw.zipcountry,
                "city" => &mut raw.city,
                "state" => &mut raw.state,
                "country" => &mut raw.country,
                "hcount" => &mut raw.hcount,
                "hstep" => &mut raw.hstep,
                "dcount" => &mut raw.dcount,
                "bg" => &mut raw.colors.bg,
                "fg" => &mut raw.colors.fg,
                "sun" => &mut raw.colors.sun,
                "sun2" => &mut raw.colors.sun2,
                "cloud" => &mut raw.colors.cloud,
                "rain" => &mut raw.colors.rain,
                "moon" => &mut raw.colors.moon,
                _ => continue,
            };
            *slot = value;
        }
        raw
    }
}

/// Parse a boolean-like parameter. Unrecognized tokens yield `None`.
pub fn parse_bool(value: Option<&str>) -> Option<bool> {
    let v = value?.trim().to_ascii_lowercase();
    match v.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a plain run of ASCII digits.
pub fn parse_uint(value: Option<&str>) -> Option<u64> {
    let v = value?.trim();
    if v.is_empty() || !v.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    v.parse().ok()
}

/// Parse `WIDTHxHEIGHT` where each side has 2 to 5 digits.
pub fn parse_resolution(value: Option<&str>) -> Option<(u32, u32)> {
    let v = value?.trim();
    let (w, h) = v.split_once(['x', 'X'])?;
    let side = |s: &str| -> Option<u32> {
        if !(2..=5).contains(&s.len()) || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok()
    };
    Some((side(w)?, side(h)?))
}

/// OpenWeather API key: exactly 32 hex characters.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn parse(value: Option<&str>) -> Option<ApiKey> {
        let v = value?.trim();
        if v.len() == 32 && v.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(ApiKey(v.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({}…)", &self.0[..4])
    }
}

/// Where the forecast is for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    CityId { id: u64 },
    Coordinates { lat: f64, lon: f64 },
    Zip { zip: String, country: Option<String> },
    City { city: String, state: Option<String>, country: Option<String> },
    Query { q: String },
}

impl Location {
    /// Resolve from request parameters: city-id > lat/lon > zip > city/state/country > q.
    pub fn from_params(raw: &RawParams) -> Option<Location> {
        if let Some(id) = parse_uint(raw.cityid.as_deref()) {
            return Some(Location::CityId { id });
        }

        let lat = parse_coordinate(raw.lat.as_deref());
        let lon = parse_coordinate(raw.lon.as_deref());
        if let (Some(lat), Some(lon)) = (lat, lon) {
            return Some(Location::Coordinates { lat, lon });
        }

        if let Some(zip) = non_empty(raw.zip.as_deref()) {
            return Some(Location::Zip { zip, country: non_empty(raw.zipcountry.as_deref()) });
        }

        if let Some(city) = non_empty(raw.city.as_deref()) {
            return Some(Location::City {
                city,
                state: non_empty(raw.state.as_deref()),
                country: non_empty(raw.country.as_deref()),
            });
        }

        non_empty(raw.q.as_deref()).map(|q| Location::Query { q })
    }

    /// OpenWeather query parameters selecting this location.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            Location::CityId { id } => vec![("id", id.to_string())],
            Location::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
            Location::Zip { zip, country } => {
                let value = match country {
                    Some(c) => format!("{zip},{c}"),
                    None => zip.clone(),
                };
                vec![("zip", value)]
            }
            Location::City { city, state, country } => {
                let parts: Vec<&str> = [Some(city.as_str()), state.as_deref(), country.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect();
                vec![("q", parts.join(","))]
            }
            Location::Query { q } => vec![("q", q.clone())],
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs = self.query_pairs();
        let mut first = true;
        for (k, v) in pairs {
            if !first {
                f.write_str("&")?;
            }
            write!(f, "{k}={v}")?;
            first = false;
        }
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn parse_coordinate(value: Option<&str>) -> Option<f64> {
    value?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Daily { days: usize },
    Hourly { hours: usize, step_minutes: u32 },
}

impl DisplayMode {
    pub fn slot_count(&self) -> usize {
        match *self {
            DisplayMode::Daily { days } => days,
            DisplayMode::Hourly { hours, .. } => hours,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    Request,
    ConfiguredDefault,
}

/// A fully validated render request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub width: u32,
    pub height: u32,
    pub scale: f64,
    pub theme: Theme,
    pub mode: DisplayMode,
    pub show_label: bool,
    pub debug: bool,
    api_key: Option<ApiKey>,
    location: Option<(Location, LocationSource)>,
}

impl RequestConfig {
    pub fn from_params(raw: &RawParams, config: &Config) -> RequestConfig {
        let (width, height) =
            parse_resolution(raw.res.as_deref()).unwrap_or((BASE_WIDTH, BASE_HEIGHT));
        let scale = f64::from(width) / f64::from(BASE_WIDTH);

        let mono = parse_bool(raw.mono.as_deref())
            .or_else(|| scheme_is_mono(raw.scheme.as_deref()))
            .unwrap_or(false);
        let palette = config.palette().with_overrides(&raw.colors);

        let hourly = parse_bool(raw.hourly.as_deref())
            .or_else(|| mode_is_hourly(raw.mode.as_deref()))
            .unwrap_or(false);
        let mode = if hourly {
            DisplayMode::Hourly {
                hours: count_param(raw.hcount.as_deref(), DEFAULT_HOURLY_COUNT, MAX_HOURLY_COUNT),
                step_minutes: count_param(
                    raw.hstep.as_deref(),
                    DEFAULT_HOURLY_STEP_MINUTES as usize,
                    MAX_HOURLY_STEP_MINUTES as usize,
                ) as u32,
            }
        } else {
            DisplayMode::Daily {
                days: count_param(raw.dcount.as_deref(), DEFAULT_DAILY_COUNT, MAX_DAILY_COUNT),
            }
        };

        let autoloc = parse_bool(raw.autoloc.as_deref()).unwrap_or(true);
        let location = match Location::from_params(raw) {
            Some(loc) => Some((loc, LocationSource::Request)),
            None if autoloc => config
                .default_location
                .clone()
                .map(|loc| (loc, LocationSource::ConfiguredDefault)),
            None => None,
        };

        let show_label = parse_bool(raw.label.as_deref()).unwrap_or(matches!(
            location,
            Some((_, LocationSource::ConfiguredDefault))
        ));

        RequestConfig {
            width,
            height,
            scale,
            theme: Theme::new(palette, mono),
            mode,
            show_label,
            debug: parse_bool(raw.debug.as_deref()).unwrap_or(false),
            api_key: ApiKey::parse(raw.apikey.as_deref()),
            location,
        }
    }

    /// Key and location for the upstream fetch, or the reason there are none.
    pub fn credentials(&self) -> Result<(&ApiKey, &Location), DashboardError> {
        let key = self.api_key.as_ref().ok_or(DashboardError::MissingApiKey)?;
        let (location, _) = self.location.as_ref().ok_or(DashboardError::MissingLocation)?;
        Ok((key, location))
    }

    pub fn location_source(&self) -> Option<LocationSource> {
        self.location.as_ref().map(|(_, source)| *source)
    }
}

fn scheme_is_mono(value: Option<&str>) -> Option<bool> {
    match value?.trim().to_ascii_lowercase().as_str() {
        "mono" | "monochrome" | "bw" => Some(true),
        "color" | "colour" => Some(false),
        _ => None,
    }
}

fn mode_is_hourly(value: Option<&str>) -> Option<bool> {
    match value?.trim().to_ascii_lowercase().as_str() {
        "hourly" => Some(true),
        "daily" => Some(false),
        _ => None,
    }
}

fn count_param(value: Option<&str>, default: usize, max: usize) -> usize {
    match parse_uint(value) {
        Some(0) | None => default,
        Some(n) => usize::try_from(n).unwrap_or(max).min(max),
    }
}
