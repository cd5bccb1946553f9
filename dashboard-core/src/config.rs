use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    params::Location,
    theme::{Palette, PaletteOverrides},
};

/// Environment variable that points at an explicit config file.
pub const CONFIG_ENV: &str = "WEATHER_DASHBOARD_CONFIG";

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
pub const DEFAULT_OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    pub listen: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenWeatherConfig {
    /// Scheme and host of the upstream API, without a trailing path.
    pub base_url: Option<String>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [server]
/// listen = "127.0.0.1:8080"
///
/// [default_location]
/// kind = "city"
/// city = "Portland"
/// state = "OR"
/// country = "US"
///
/// [palette]
/// bg = "#FFFFFF"
/// fg = "#000000"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub openweather: OpenWeatherConfig,

    /// Used when a request names no location and `autoloc` is on.
    pub default_location: Option<Location>,

    /// Default swatches; request colors are applied on top.
    pub palette: PaletteOverrides,
}

impl Config {
    pub fn listen_addr(&self) -> &str {
        self.server.listen.as_deref().unwrap_or(DEFAULT_LISTEN)
    }

    pub fn openweather_base_url(&self) -> &str {
        self.openweather
            .base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or(DEFAULT_OPENWEATHER_BASE_URL)
    }

    /// Built-in palette with the configured defaults applied.
    pub fn palette(&self) -> Palette {
        Palette::default().with_overrides(&self.palette)
    }

    pub fn set_default_location(&mut self, location: Location) {
        self.default_location = Some(location);
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file: `$WEATHER_DASHBOARD_CONFIG`, else the platform config dir.
    pub fn config_file_path() -> Result<PathBuf> {
        if let Ok(explicit) = std::env::var(CONFIG_ENV) {
            if !explicit.trim().is_empty() {
                return Ok(PathBuf::from(explicit));
            }
        }

        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_empty() {
        let cfg = Config::default();
        assert_eq!(cfg.listen_addr(), "0.0.0.0:8080");
        assert_eq!(cfg.openweather_base_url(), "https://api.openweathermap.org");
        assert_eq!(cfg.palette(), Palette::default());
        assert!(cfg.default_location.is_none());
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.server.listen = Some("127.0.0.1:9000".into());
        cfg.set_default_location(Location::Zip { zip: "94040".into(), country: Some("US".into()) });
        cfg.palette.bg = Some("#fff".into());
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.listen_addr(), "127.0.0.1:9000");
        assert_eq!(loaded.palette().bg, "#FFFFFF");
    }

    #[test]
    fn partial_file_parses() {
        let cfg: Config = toml::from_str(
            r#"
            [openweather]
            base_url = "http://localhost:9999/"

            [default_location]
            kind = "city_id"
            id = 2643743
            "#,
        )
        .unwrap();
        assert_eq!(cfg.openweather_base_url(), "http://localhost:9999");
        assert_eq!(cfg.default_location, Some(Location::CityId { id: 2643743 }));
        assert_eq!(cfg.listen_addr(), DEFAULT_LISTEN);
    }

    #[test]
    fn invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "server = 3").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
