//! Weather and precipitation glyphs, painted with the request's theme.

use crate::{model::PrecipType, render::template, theme::Theme};

const CLEAR_DAY: &str = include_str!("../../templates/svg/weather_01d.svg");
const CLEAR_NIGHT: &str = include_str!("../../templates/svg/weather_01n.svg");
const PARTLY_CLOUDY_DAY: &str = include_str!("../../templates/svg/weather_02d.svg");
const PARTLY_CLOUDY_NIGHT: &str = include_str!("../../templates/svg/weather_02n.svg");
const CLOUDY: &str = include_str!("../../templates/svg/weather_03.svg");
const SHOWERS: &str = include_str!("../../templates/svg/weather_09.svg");
const RAIN_DAY: &str = include_str!("../../templates/svg/weather_10d.svg");
const SNOW: &str = include_str!("../../templates/svg/weather_13.svg");

const PRECIP_RAIN: &str = include_str!("../../templates/svg/precip_rain.svg");
const PRECIP_SNOW: &str = include_str!("../../templates/svg/precip_snow.svg");
const PRECIP_MIX: &str = include_str!("../../templates/svg/precip_mix.svg");

/// Template for an OpenWeather icon code such as `10d`; unknown codes are cloudy.
pub fn weather_template(icon: &str) -> &'static str {
    let is_day = icon.ends_with('d');
    match icon.get(..2).unwrap_or("") {
        "01" if is_day => CLEAR_DAY,
        "01" => CLEAR_NIGHT,
        "02" if is_day => PARTLY_CLOUDY_DAY,
        "02" => PARTLY_CLOUDY_NIGHT,
        "03" | "04" => CLOUDY,
        "09" => SHOWERS,
        "10" if is_day => RAIN_DAY,
        "10" => SHOWERS,
        "13" => SNOW,
        _ => CLOUDY,
    }
}

pub fn weather_svg(icon: &str, theme: &Theme) -> String {
    let colors = theme.icon_colors();
    let css_vars = colors.css_vars();
    template::render(
        weather_template(icon),
        &[
            ("css_vars", css_vars.as_str()),
            ("sun", colors.sun),
            ("sun2", colors.sun2),
            ("cloud", colors.cloud),
            ("rain", colors.rain),
            ("moon", colors.moon),
        ],
    )
}

/// Inline glyph next to a precipitation amount; empty for [`PrecipType::None`].
pub fn precip_svg(kind: PrecipType, theme: &Theme) -> String {
    let template = match kind {
        PrecipType::Rain => PRECIP_RAIN,
        PrecipType::Snow => PRECIP_SNOW,
        PrecipType::Mix => PRECIP_MIX,
        PrecipType::None => return String::new(),
    };
    let css_vars = theme.icon_colors().css_vars();
    template::render(template, &[("css_vars", css_vars.as_str())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{Palette, PaletteOverrides};

    fn theme(mono: bool) -> Theme {
        let overrides = PaletteOverrides {
            cloud: Some("#123456".into()),
            rain: Some("#00FF00".into()),
            sun2: Some("#FF00FF".into()),
            ..Default::default()
        };
        Theme::new(Palette::default().with_overrides(&overrides), mono)
    }

    #[test]
    fn icon_codes_map_to_templates() {
        assert_eq!(weather_template("01d"), CLEAR_DAY);
        assert_eq!(weather_template("01n"), CLEAR_NIGHT);
        assert_eq!(weather_template("02n"), PARTLY_CLOUDY_NIGHT);
        assert_eq!(weather_template("04d"), CLOUDY);
        assert_eq!(weather_template("10d"), RAIN_DAY);
        assert_eq!(weather_template("10n"), SHOWERS);
        assert_eq!(weather_template("13n"), SNOW);
    }

    #[test]
    fn unknown_codes_fall_back_to_cloudy() {
        assert_eq!(weather_template("50d"), CLOUDY);
        assert_eq!(weather_template("11n"), CLOUDY);
        assert_eq!(weather_template(""), CLOUDY);
        assert_eq!(weather_template("é"), CLOUDY);
    }

    #[test]
    fn weather_svg_has_no_placeholders_left() {
        for icon in ["01d", "01n", "02d", "02n", "03d", "09n", "10d", "13d", "xx"] {
            let svg = weather_svg(icon, &theme(false));
            assert!(svg.starts_with("<svg"), "{icon}");
            assert!(!svg.contains("{{"), "{icon}");
        }
    }

    #[test]
    fn color_mode_uses_overrides() {
        let svg = weather_svg("10d", &theme(false));
        assert!(svg.contains("--cloud:#123456;"));
        assert!(svg.contains("stroke=\"#00FF00\""));
    }

    #[test]
    fn mono_paints_secondary_colors_with_fg() {
        let svg = weather_svg("10d", &theme(true));
        assert!(!svg.contains("#123456"));
        assert!(!svg.contains("#00FF00"));
        assert!(!svg.contains("#FF00FF"));
        assert!(svg.contains("--cloud:#FFFFFF;--rain:#FFFFFF;"));
        assert!(svg.contains("fill=\"#FFFFFF\""));
    }

    #[test]
    fn gradient_ids_are_unique_per_icon() {
        let a = weather_svg("01d", &theme(false));
        let b = weather_svg("01d", &theme(false));
        assert!(!a.contains("id=\"g\""));
        assert!(!a.contains("url(#g)"));
        assert_ne!(a, b);
    }

    #[test]
    fn precip_glyphs() {
        assert!(precip_svg(PrecipType::None, &theme(false)).is_empty());
        for kind in [PrecipType::Rain, PrecipType::Snow, PrecipType::Mix] {
            let svg = precip_svg(kind, &theme(false));
            assert!(svg.contains("--rain:#00FF00;"), "{kind}");
        }
        assert!(precip_svg(PrecipType::Rain, &theme(true)).contains("--rain:#FFFFFF;"));
    }
}
