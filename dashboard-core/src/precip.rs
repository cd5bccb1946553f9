//! Precipitation derivation and display formatting.
//!
//! Everything here is total: missing or odd input degrades to zero/none.

use crate::model::PrecipType;

pub const MM_TO_IN: f64 = 1.0 / 25.4;

/// Classify precipitation from amounts, falling back to the icon when only POP hints at it.
pub fn precip_type(rain_mm: f64, snow_mm: f64, icon: Option<&str>, pop_pct: i64) -> PrecipType {
    let rain = rain_mm > 0.0;
    let snow = snow_mm > 0.0;

    match (rain, snow) {
        (true, true) => return PrecipType::Mix,
        (true, false) => return PrecipType::Rain,
        (false, true) => return PrecipType::Snow,
        (false, false) => {}
    }

    if pop_pct > 0 {
        if let Some(code) = icon.and_then(|i| i.get(..2)) {
            match code {
                "13" => return PrecipType::Snow,
                "09" | "10" => return PrecipType::Rain,
                _ => {}
            }
        }
    }
    PrecipType::None
}

/// Hourly rate from an OpenWeather `{"1h": .., "3h": ..}` pair.
pub fn hourly_rate_mm(one_hour: Option<f64>, three_hours: Option<f64>) -> f64 {
    match (one_hour, three_hours) {
        (Some(v), _) => v,
        (None, Some(v)) => v / 3.0,
        (None, None) => 0.0,
    }
}

pub fn mm_to_in(mm: f64) -> f64 {
    mm * MM_TO_IN
}

/// Inches with two decimals; anything below 0.005 reads "0.00".
pub fn fmt_in(inches: f64) -> String {
    if inches.is_nan() || inches < 0.005 {
        return "0.00".to_string();
    }
    format!("{inches:.2}")
}

/// Probability as a whole percentage in `[0, 100]`.
pub fn fmt_pop(pop_pct: f64) -> u8 {
    if pop_pct.is_nan() {
        return 0;
    }
    pop_pct.clamp(0.0, 100.0).round() as u8
}

/// OpenWeather `pop` (0..1) to a rounded percentage.
pub fn pop_pct(pop: f64) -> i64 {
    if pop.is_finite() { (pop * 100.0).round() as i64 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_decide_first() {
        assert_eq!(precip_type(1.0, 0.5, None, 0), PrecipType::Mix);
        assert_eq!(precip_type(0.1, 0.1, Some("01d"), 90), PrecipType::Mix);
        assert_eq!(precip_type(2.0, 0.0, Some("13d"), 50), PrecipType::Rain);
        assert_eq!(precip_type(0.0, 2.0, Some("10d"), 50), PrecipType::Snow);
        assert_eq!(precip_type(0.0, 0.0, Some("10d"), 0), PrecipType::None);
        assert_eq!(precip_type(0.0, 0.0, None, 0), PrecipType::None);
    }

    #[test]
    fn icon_fallback_needs_pop() {
        assert_eq!(precip_type(0.0, 0.0, Some("13n"), 20), PrecipType::Snow);
        assert_eq!(precip_type(0.0, 0.0, Some("09d"), 20), PrecipType::Rain);
        assert_eq!(precip_type(0.0, 0.0, Some("10n"), 1), PrecipType::Rain);
        assert_eq!(precip_type(0.0, 0.0, Some("04d"), 80), PrecipType::None);
        assert_eq!(precip_type(0.0, 0.0, Some("1"), 80), PrecipType::None);
        assert_eq!(precip_type(0.0, 0.0, None, 80), PrecipType::None);
    }

    #[test]
    fn hourly_rate_prefers_one_hour() {
        assert_eq!(hourly_rate_mm(Some(1.2), Some(9.0)), 1.2);
        assert_eq!(hourly_rate_mm(None, Some(1.5)), 0.5);
        assert_eq!(hourly_rate_mm(None, None), 0.0);
    }

    #[test]
    fn fmt_in_floors_tiny_values() {
        assert_eq!(fmt_in(0.0), "0.00");
        assert_eq!(fmt_in(0.0049), "0.00");
        assert_eq!(fmt_in(-3.0), "0.00");
        assert_eq!(fmt_in(0.005), "0.01");
        assert_eq!(fmt_in(mm_to_in(3.0)), "0.12");
    }

    #[test]
    fn fmt_in_is_monotonic() {
        let mut last = 0.0_f64;
        for i in 0..2000 {
            let v = i as f64 * 0.0013;
            let shown: f64 = fmt_in(v).parse().unwrap();
            assert!(shown >= last, "{v} -> {shown} < {last}");
            last = shown;
        }
    }

    #[test]
    fn fmt_pop_clamps() {
        assert_eq!(fmt_pop(-5.0), 0);
        assert_eq!(fmt_pop(150.0), 100);
        assert_eq!(fmt_pop(49.6), 50);
        assert_eq!(fmt_pop(f64::NAN), 0);
    }

    #[test]
    fn pop_pct_rounds() {
        assert_eq!(pop_pct(0.5), 50);
        assert_eq!(pop_pct(0.284), 28);
        assert_eq!(pop_pct(f64::NAN), 0);
    }
}
