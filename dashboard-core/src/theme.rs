//! Colors and the rendering theme.

use serde::{Deserialize, Serialize};

/// Normalize a hex color string into uppercase `#RRGGBB`.
///
/// Accepts `#RGB`, `RGB`, `#RRGGBB` and `RRGGBB`. Returns `None` for anything else.
pub fn normalize_hex_color(value: &str) -> Option<String> {
    let v = value.trim();
    let digits = v.strip_prefix('#').unwrap_or(v);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    match digits.len() {
        3 => {
            let mut out = String::with_capacity(7);
            out.push('#');
            for c in digits.chars() {
                let c = c.to_ascii_uppercase();
                out.push(c);
                out.push(c);
            }
            Some(out)
        }
        6 => Some(format!("#{}", digits.to_ascii_uppercase())),
        _ => None,
    }
}

/// Normalize a raw color value and fall back to a default.
pub fn color_or(raw: Option<&str>, default: &str) -> String {
    raw.and_then(normalize_hex_color).unwrap_or_else(|| default.to_string())
}

/// The seven named swatches a dashboard is painted with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub bg: String,
    pub fg: String,
    pub sun: String,
    pub sun2: String,
    pub cloud: String,
    pub rain: String,
    pub moon: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bg: "#000000".to_string(),
            fg: "#FFFFFF".to_string(),
            sun: "#FFD400".to_string(),
            sun2: "#FF6A00".to_string(),
            cloud: "#FFFFFF".to_string(),
            rain: "#006EFF".to_string(),
            moon: "#FFFAA2".to_string(),
        }
    }
}

/// Optional per-swatch overrides, as they arrive from a request or a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteOverrides {
    pub bg: Option<String>,
    pub fg: Option<String>,
    pub sun: Option<String>,
    pub sun2: Option<String>,
    pub cloud: Option<String>,
    pub rain: Option<String>,
    pub moon: Option<String>,
}

impl Palette {
    /// Apply overrides on top of `self`; invalid colors keep the current swatch.
    pub fn with_overrides(&self, o: &PaletteOverrides) -> Palette {
        Palette {
            bg: color_or(o.bg.as_deref(), &self.bg),
            fg: color_or(o.fg.as_deref(), &self.fg),
            sun: color_or(o.sun.as_deref(), &self.sun),
            sun2: color_or(o.sun2.as_deref(), &self.sun2),
            cloud: color_or(o.cloud.as_deref(), &self.cloud),
            rain: color_or(o.rain.as_deref(), &self.rain),
            moon: color_or(o.moon.as_deref(), &self.moon),
        }
    }
}

/// Palette plus mono flag, handed explicitly to every renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub palette: Palette,
    pub mono: bool,
}

/// Colors actually painted into an icon once mono mode has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconColors<'a> {
    pub bg: &'a str,
    pub fg: &'a str,
    pub sun: &'a str,
    pub sun2: &'a str,
    pub cloud: &'a str,
    pub rain: &'a str,
    pub moon: &'a str,
}

impl Theme {
    pub fn new(palette: Palette, mono: bool) -> Self {
        Self { palette, mono }
    }

    /// Mono collapses the secondary sun, cloud and rain hues onto the foreground.
    pub fn icon_colors(&self) -> IconColors<'_> {
        let p = &self.palette;
        let (sun2, cloud, rain) = if self.mono {
            (p.fg.as_str(), p.fg.as_str(), p.fg.as_str())
        } else {
            (p.sun2.as_str(), p.cloud.as_str(), p.rain.as_str())
        };
        IconColors {
            bg: &p.bg,
            fg: &p.fg,
            sun: &p.sun,
            sun2,
            cloud,
            rain,
            moon: &p.moon,
        }
    }
}

impl IconColors<'_> {
    /// Inline CSS custom properties for a `style` attribute.
    pub fn css_vars(&self) -> String {
        format!(
            "--bg:{};--fg:{};--sun:{};--sun2:{};--cloud:{};--rain:{};--moon:{};",
            self.bg, self.fg, self.sun, self.sun2, self.cloud, self.rain, self.moon
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_short_form_and_uppercases() {
        assert_eq!(normalize_hex_color("#a1b").as_deref(), Some("#AA11BB"));
        assert_eq!(normalize_hex_color("a1b").as_deref(), Some("#AA11BB"));
        assert_eq!(normalize_hex_color("#ff6a00").as_deref(), Some("#FF6A00"));
        assert_eq!(normalize_hex_color(" 006eff ").as_deref(), Some("#006EFF"));
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["#abc", "ABC", "#123456", "abcdef", "#0f0"] {
            let once = normalize_hex_color(raw).unwrap();
            let twice = normalize_hex_color(&once).unwrap();
            assert_eq!(once, twice);
            assert_eq!(once.len(), 7);
            assert!(once.starts_with('#'));
            assert_eq!(once, once.to_ascii_uppercase());
        }
    }

    #[test]
    fn rejects_everything_else() {
        for raw in ["", "#", "#12", "#1234", "#12345", "#1234567", "ggg", "#xyzxyz", "##abc", "red"] {
            assert_eq!(normalize_hex_color(raw), None, "{raw:?}");
            assert_eq!(color_or(Some(raw), "#010203"), "#010203");
        }
        assert_eq!(color_or(None, "#010203"), "#010203");
    }

    #[test]
    fn overrides_fall_back_per_swatch() {
        let overrides = PaletteOverrides {
            bg: Some("fff".into()),
            rain: Some("not-a-color".into()),
            ..Default::default()
        };
        let p = Palette::default().with_overrides(&overrides);
        assert_eq!(p.bg, "#FFFFFF");
        assert_eq!(p.rain, "#006EFF");
        assert_eq!(p.fg, "#FFFFFF");
    }

    #[test]
    fn mono_collapses_secondary_hues_onto_fg() {
        let palette = Palette {
            fg: "#111111".into(),
            sun2: "#222222".into(),
            cloud: "#333333".into(),
            rain: "#444444".into(),
            ..Palette::default()
        };
        let mono = Theme::new(palette.clone(), true);
        let colors = mono.icon_colors();
        assert_eq!(colors.sun2, "#111111");
        assert_eq!(colors.cloud, "#111111");
        assert_eq!(colors.rain, "#111111");
        assert_eq!(colors.sun, "#FFD400");
        // stored palette is untouched
        assert_eq!(mono.palette.cloud, "#333333");

        let color = Theme::new(palette, false);
        assert_eq!(color.icon_colors().cloud, "#333333");
    }
}
