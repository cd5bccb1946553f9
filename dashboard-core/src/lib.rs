//! Core library for the weather dashboard renderer.
//!
//! This crate defines:
//! - Request parameter resolution and the TOML configuration file
//! - The OpenWeather client behind the `WeatherProvider` abstraction
//! - Daily aggregation and hourly interpolation of the 3-hour forecast
//! - HTML/SVG rendering of the dashboard, error page and debug dump
//!
//! It is used by `dashboard-cli`, but can also be embedded in other servers.

pub mod config;
pub mod daily;
pub mod dashboard;
pub mod error;
pub mod hourly;
pub mod model;
pub mod params;
pub mod precip;
pub mod provider;
pub mod render;
pub mod theme;

pub use config::Config;
pub use dashboard::{PageKind, RenderedPage, render_page};
pub use error::DashboardError;
pub use model::{CurrentConditions, ForecastPoint, PrecipType, WeatherSnapshot};
pub use params::{ApiKey, Location, RawParams, RequestConfig};
pub use provider::{WeatherProvider, provider_from_config};
pub use theme::{Palette, Theme};
