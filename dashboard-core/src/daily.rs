//! Daily aggregation and the "today"/"now" summary.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

use crate::{
    model::{CurrentConditions, DaySlot, ForecastPoint, NowSummary},
    precip::{mm_to_in, pop_pct, precip_type},
};

const MIDDAY_SECS: i64 = 12 * 3600;

/// Local wall-clock time of a UTC timestamp, for a fixed offset in seconds.
pub(crate) fn local_naive(ts_utc: i64, offset_secs: i32) -> NaiveDateTime {
    DateTime::from_timestamp(ts_utc + i64::from(offset_secs), 0)
        .unwrap_or_default()
        .naive_utc()
}

struct DayAcc {
    date: NaiveDate,
    /// Distance of the representative point from local noon.
    dist: i64,
    rep: ForecastPoint,
    rain_mm: f64,
    snow_mm: f64,
    pop_max: f64,
}

/// Group forecast points by local calendar day, skipping today.
///
/// Days keep the order of their first point. Each day's icon, description and
/// temperature come from the point nearest local noon (first one wins a tie);
/// precipitation is summed and POP maxed over every point of the day.
pub fn aggregate_days(
    points: &[ForecastPoint],
    offset_secs: i32,
    now: DateTime<Utc>,
    max_days: usize,
) -> Vec<DaySlot> {
    let today = local_naive(now.timestamp(), offset_secs).date();
    let mut days: Vec<DayAcc> = Vec::new();

    for point in points {
        let local = local_naive(point.ts, offset_secs);
        let date = local.date();
        if date == today {
            continue;
        }

        let secs_into_day = i64::from(local.hour()) * 3600 + i64::from(local.minute()) * 60;
        let dist = (secs_into_day - MIDDAY_SECS).abs();

        let idx = match days.iter().position(|d| d.date == date) {
            Some(idx) => idx,
            None => {
                days.push(DayAcc {
                    date,
                    dist,
                    rep: point.clone(),
                    rain_mm: 0.0,
                    snow_mm: 0.0,
                    pop_max: 0.0,
                });
                days.len() - 1
            }
        };

        let day = &mut days[idx];
        if dist < day.dist {
            day.dist = dist;
            day.rep = point.clone();
        }
        day.rain_mm += point.rain_3h_mm;
        day.snow_mm += point.snow_3h_mm;
        if point.pop > day.pop_max {
            day.pop_max = point.pop;
        }
    }

    days.into_iter()
        .take(max_days)
        .map(|d| DaySlot {
            date: d.date,
            label: d.date.format("%a").to_string(),
            temperature_f: d.rep.temperature_f,
            precip_type: precip_type(d.rain_mm, d.snow_mm, Some(d.rep.icon.as_str()), pop_pct(d.pop_max)),
            icon: d.rep.icon,
            description: d.rep.description,
            rain_mm: d.rain_mm,
            snow_mm: d.snow_mm,
            pop_max: d.pop_max,
        })
        .collect()
}

/// Today's totals plus the upcoming ("now") forecast bucket.
pub fn summarize_now(
    points: &[ForecastPoint],
    current: &CurrentConditions,
    now: DateTime<Utc>,
) -> NowSummary {
    let offset = current.utc_offset_secs;
    let now_ts = now.timestamp();
    let today = local_naive(now_ts, offset).date();

    let mut rain_mm = 0.0;
    let mut snow_mm = 0.0;
    let mut pop_max: f64 = 0.0;
    // Only today's local date counts, not the whole 5-day list.
    for point in points.iter().filter(|p| local_naive(p.ts, offset).date() == today) {
        rain_mm += point.rain_3h_mm;
        snow_mm += point.snow_3h_mm;
        pop_max = pop_max.max(point.pop);
    }
    let today_pop_pct = pop_pct(pop_max);

    let (now_pop_pct, now_precip_type) = match points.iter().find(|p| p.ts > now_ts) {
        Some(next) => {
            let pct = pop_pct(next.pop);
            (pct, precip_type(next.rain_3h_mm, next.snow_3h_mm, Some(next.icon.as_str()), pct))
        }
        None => (0, precip_type(0.0, 0.0, None, 0)),
    };

    NowSummary {
        today_precip_in: mm_to_in(rain_mm + snow_mm),
        today_pop_pct,
        today_precip_type: precip_type(rain_mm, snow_mm, None, today_pop_pct),
        now_pop_pct,
        now_precip_type,
        current_rate_in_hr: current.precip_rate_in_hr(),
    }
}
