use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::precip::{MM_TO_IN, pop_pct};

/// Current conditions at the requested location, in imperial units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    /// Seconds east of UTC for the location.
    pub utc_offset_secs: i32,
    pub observed_at: Option<DateTime<Utc>>,
    pub temperature_f: f64,
    pub feels_like_f: f64,
    pub humidity_pct: f64,
    pub wind_speed_mph: f64,
    pub icon: String,
    pub main: String,
    pub description: String,
    pub rain_rate_mm_hr: f64,
    pub snow_rate_mm_hr: f64,
}

impl CurrentConditions {
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_secs).unwrap_or_else(|| Utc.fix())
    }

    /// Combined rain and snow rate in inches per hour.
    pub fn precip_rate_in_hr(&self) -> f64 {
        (self.rain_rate_mm_hr + self.snow_rate_mm_hr).max(0.0) * MM_TO_IN
    }
}

/// One entry of the 5 day / 3 hour forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// UTC seconds.
    pub ts: i64,
    pub temperature_f: f64,
    pub icon: String,
    pub description: String,
    pub rain_3h_mm: f64,
    pub snow_3h_mm: f64,
    /// Probability of precipitation, 0..1.
    pub pop: f64,
}

impl ForecastPoint {
    pub fn precip_3h_mm(&self) -> f64 {
        self.rain_3h_mm + self.snow_3h_mm
    }
}

/// Everything fetched from upstream for a single render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecipType {
    Rain,
    Snow,
    Mix,
    None,
}

impl PrecipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrecipType::Rain => "rain",
            PrecipType::Snow => "snow",
            PrecipType::Mix => "mix",
            PrecipType::None => "none",
        }
    }
}

impl std::fmt::Display for PrecipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar day in daily mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySlot {
    pub date: NaiveDate,
    /// Short weekday name, e.g. "Tue".
    pub label: String,
    pub temperature_f: f64,
    pub icon: String,
    pub description: String,
    pub rain_mm: f64,
    pub snow_mm: f64,
    pub pop_max: f64,
    pub precip_type: PrecipType,
}

impl DaySlot {
    pub fn precip_mm(&self) -> f64 {
        self.rain_mm + self.snow_mm
    }

    pub fn precip_in(&self) -> f64 {
        self.precip_mm() * MM_TO_IN
    }

    pub fn pop_pct(&self) -> i64 {
        pop_pct(self.pop_max)
    }
}

/// A time tick in hourly mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourSlot {
    /// Local clock time, e.g. "3:00pm".
    pub label: String,
    pub target_utc: i64,
    pub temperature_f: f64,
    pub icon: String,
    pub precip_in: f64,
    pub pop_pct: i64,
    pub precip_type: PrecipType,
}

/// Values shown in the "now" card next to the current conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NowSummary {
    pub today_precip_in: f64,
    pub today_pop_pct: i64,
    pub today_precip_type: PrecipType,
    pub now_pop_pct: i64,
    pub now_precip_type: PrecipType,
    pub current_rate_in_hr: f64,
}
