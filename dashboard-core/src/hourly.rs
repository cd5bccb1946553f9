//! Hourly ticks interpolated from the 3-hour forecast.

use chrono::{DateTime, Utc};

use crate::{
    daily::local_naive,
    model::{ForecastPoint, HourSlot},
    precip::{mm_to_in, pop_pct, precip_type},
};

/// Width of one OpenWeather forecast bucket.
const BUCKET_SECS: f64 = 3.0 * 3600.0;

/// First local tick strictly after `now_local`, aligned to `step_secs`.
pub fn next_boundary(now_local: i64, step_secs: i64) -> i64 {
    now_local.div_euclid(step_secs) * step_secs + step_secs
}

/// Points bracketing `target`: last at or before it, first strictly after it.
///
/// Falls back to the first/last point when the target is outside the forecast.
fn bracket(points: &[ForecastPoint], target: i64) -> Option<(&ForecastPoint, &ForecastPoint)> {
    let split = points.iter().position(|p| p.ts > target).unwrap_or(points.len());
    let prev = if split > 0 { points.get(split - 1) } else { points.first() }?;
    let next = points.get(split).or_else(|| points.last())?;
    Some((prev, next))
}

/// Temperature at `target`, linear between the bracketing points.
pub fn interpolate_temp(prev: &ForecastPoint, next: &ForecastPoint, target: i64) -> f64 {
    if next.ts == prev.ts {
        return next.temperature_f;
    }
    let alpha = ((target - prev.ts) as f64 / (next.ts - prev.ts) as f64).clamp(0.0, 1.0);
    prev.temperature_f + (next.temperature_f - prev.temperature_f) * alpha
}

/// Build `count` ticks, `step_minutes` apart, starting at the next aligned local boundary.
///
/// Precipitation and POP for a tick come from the upcoming bucket, scaled to the
/// tick's share of its three hours. An empty forecast yields no ticks.
pub fn interpolate_hours(
    points: &[ForecastPoint],
    offset_secs: i32,
    now: DateTime<Utc>,
    count: usize,
    step_minutes: u32,
) -> Vec<HourSlot> {
    let step_secs = i64::from(step_minutes.max(1)) * 60;
    let offset = i64::from(offset_secs);
    let first_tick = next_boundary(now.timestamp() + offset, step_secs);
    let share = step_secs as f64 / BUCKET_SECS;

    let mut slots = Vec::with_capacity(count);
    for i in 0..count as i64 {
        let target_local = first_tick + i * step_secs;
        let target_utc = target_local - offset;

        let Some((prev, next)) = bracket(points, target_utc) else {
            break;
        };

        let rain_mm = next.rain_3h_mm * share;
        let snow_mm = next.snow_3h_mm * share;
        let pct = pop_pct(next.pop);

        slots.push(HourSlot {
            label: local_naive(target_utc, offset_secs).format("%-I:%M%P").to_string(),
            target_utc,
            temperature_f: interpolate_temp(prev, next, target_utc),
            icon: next.icon.clone(),
            precip_in: mm_to_in(rain_mm + snow_mm),
            pop_pct: pct,
            precip_type: precip_type(rain_mm, snow_mm, Some(next.icon.as_str()), pct),
        });
    }
    slots
}
