//! Whole-document rendering: the dashboard itself, the error page and the debug dump.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::{
    daily::local_naive,
    model::{CurrentConditions, DaySlot, HourSlot, NowSummary, PrecipType, WeatherSnapshot},
    params::{BASE_HEIGHT, BASE_WIDTH, RequestConfig},
    precip::{fmt_in, fmt_pop},
    render::{icons, template},
    theme::Theme,
};

const PAGE: &str = include_str!("../../templates/page.html");

/// Forecast entries shown in the debug dump.
const DEBUG_ENTRIES: usize = 8;

/// Current precipitation rates below this are not worth a line.
const MIN_RATE_IN_HR: f64 = 0.005;

/// One column of the forecast row, in either daily or hourly mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastCard {
    pub name: String,
    pub icon: String,
    pub temperature_f: f64,
    pub precip_in: f64,
    pub pop_pct: i64,
    pub precip_type: PrecipType,
}

impl From<&DaySlot> for ForecastCard {
    fn from(day: &DaySlot) -> Self {
        Self {
            name: day.label.clone(),
            icon: day.icon.clone(),
            temperature_f: day.temperature_f,
            precip_in: day.precip_in(),
            pop_pct: day.pop_pct(),
            precip_type: day.precip_type,
        }
    }
}

impl From<&HourSlot> for ForecastCard {
    fn from(hour: &HourSlot) -> Self {
        Self {
            name: hour.label.clone(),
            icon: hour.icon.clone(),
            temperature_f: hour.temperature_f,
            precip_in: hour.precip_in,
            pop_pct: hour.pop_pct,
            precip_type: hour.precip_type,
        }
    }
}

/// Escape text for HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Scale factor for CSS: at most six decimals, trailing zeros dropped.
pub fn fmt_scale(scale: f64) -> String {
    let fixed = format!("{scale:.6}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Font and icon scale for the forecast row so that more than five slots still fit.
pub fn slot_scale(slot_count: usize) -> f64 {
    (5.0 / slot_count.max(1) as f64).min(1.0)
}

fn round_temp(value: f64) -> i64 {
    value.round() as i64
}

fn precip_line(theme: &Theme, kind: PrecipType, text: &str) -> String {
    format!(
        "<span class=\"precip-inline\">{}<span>{}</span></span>",
        icons::precip_svg(kind, theme),
        text
    )
}

fn forecast_row(cards: &[ForecastCard], theme: &Theme) -> String {
    let mut out = String::new();
    for card in cards {
        let precip = format!("{}in {}%", fmt_in(card.precip_in), fmt_pop(card.pop_pct as f64));
        let _ = write!(
            out,
            concat!(
                "                <div class=\"day\">\n",
                "                    <div class=\"day-name\">{name}</div>\n",
                "                    <div class=\"day-icon\">{icon}</div>\n",
                "                    <div class=\"day-temp\">{temp}&deg;</div>\n",
                "                    <div class=\"day-precip\">{precip}</div>\n",
                "                </div>\n",
            ),
            name = escape_html(&card.name),
            icon = icons::weather_svg(&card.icon, theme),
            temp = round_temp(card.temperature_f),
            precip = precip_line(theme, card.precip_type, &precip),
        );
    }
    out
}

/// Full dashboard document at the request's target resolution.
pub fn render_dashboard(
    request: &RequestConfig,
    current: &CurrentConditions,
    summary: &NowSummary,
    cards: &[ForecastCard],
) -> String {
    let theme = &request.theme;
    let palette = &theme.palette;

    let corner_label = if request.show_label {
        format!(
            "            <div class=\"corner-label\">{}</div>",
            escape_html(&current.location_name)
        )
    } else {
        String::new()
    };

    let today_precip = format!(
        "{}in {}% (now {}%)",
        fmt_in(summary.today_precip_in),
        fmt_pop(summary.today_pop_pct as f64),
        fmt_pop(summary.now_pop_pct as f64)
    );

    let rate_line = if summary.current_rate_in_hr >= MIN_RATE_IN_HR {
        format!(
            "                    <div class=\"detail-line\">{}</div>",
            precip_line(
                theme,
                summary.now_precip_type,
                &format!("{}in/hr", fmt_in(summary.current_rate_in_hr))
            )
        )
    } else {
        String::new()
    };

    let target_w = request.width.to_string();
    let target_h = request.height.to_string();
    let base_w = BASE_WIDTH.to_string();
    let base_h = BASE_HEIGHT.to_string();
    let scale = fmt_scale(request.scale);
    let slot_scale = fmt_scale(slot_scale(request.mode.slot_count()));
    let main_icon = icons::weather_svg(&current.icon, theme);
    let temp = round_temp(current.temperature_f).to_string();
    let description = escape_html(&current.description);
    let feels_like = round_temp(current.feels_like_f).to_string();
    let humidity = current.humidity_pct.round().to_string();
    let wind = round_temp(current.wind_speed_mph).to_string();
    let today_glyph = icons::precip_svg(summary.today_precip_type, theme);
    let forecast = forecast_row(cards, theme);

    template::fill(
        PAGE,
        &[
            ("target_w", target_w.as_str()),
            ("target_h", target_h.as_str()),
            ("base_w", base_w.as_str()),
            ("base_h", base_h.as_str()),
            ("scale", scale.as_str()),
            ("slot_scale", slot_scale.as_str()),
            ("bg", palette.bg.as_str()),
            ("fg", palette.fg.as_str()),
            ("corner_label", corner_label.as_str()),
            ("main_icon", main_icon.as_str()),
            ("temp", temp.as_str()),
            ("description", description.as_str()),
            ("feels_like", feels_like.as_str()),
            ("humidity", humidity.as_str()),
            ("wind", wind.as_str()),
            ("today_glyph", today_glyph.as_str()),
            ("today_precip", today_precip.as_str()),
            ("rate_line", rate_line.as_str()),
            ("forecast", forecast.as_str()),
        ],
    )
}

/// Minimal red-on-black page sized to the target display.
pub fn render_error(width: u32, height: u32, message: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><style>",
            "body{{margin:0;width:{w}px;height:{h}px;background:#000;color:#f00;",
            "font:24px/1.4 Arial, sans-serif;font-weight:800;padding:20px;box-sizing:border-box;}}",
            "</style></head><body>Error: {msg}</body></html>",
        ),
        w = width,
        h = height,
        msg = escape_html(message),
    )
}

/// Plain-text dump of the clock, offset, current observation and first forecast entries.
pub fn render_debug(snapshot: &WeatherSnapshot, now: DateTime<Utc>) -> String {
    let current = &snapshot.current;
    let offset = current.utc_offset_secs;
    let mut out = String::from(
        "<pre style=\"color:#fff;background:#000;padding:12px;font:16px/1.4 monospace\">",
    );

    let _ = writeln!(out, "NOW_UTC     : {}", now.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "TZ_OFFSET   : {offset} seconds");
    let _ = writeln!(
        out,
        "NOW_LOCAL   : {}\n",
        local_naive(now.timestamp(), offset).format("%Y-%m-%d %H:%M:%S")
    );
    if !current.icon.is_empty() {
        let _ = writeln!(
            out,
            "CURRENT     : {} / {} ({})",
            escape_html(&current.main),
            escape_html(&current.description),
            escape_html(&current.icon)
        );
    }
    if let Some(observed) = current.observed_at {
        let _ = writeln!(
            out,
            "OBSERVED    : {}",
            local_naive(observed.timestamp(), offset).format("%Y-%m-%d %H:%M:%S")
        );
    }

    let _ = writeln!(out, "\nNEXT FORECAST SLOTS (first {DEBUG_ENTRIES}):");
    for point in snapshot.forecast.iter().take(DEBUG_ENTRIES) {
        let _ = writeln!(
            out,
            "- {} | {} ({})",
            local_naive(point.ts, offset).format("%a %-I:%M%P"),
            escape_html(&point.description),
            escape_html(&point.icon)
        );
    }
    out.push_str("</pre>");
    out
}
