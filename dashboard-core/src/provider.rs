use crate::{
    config::Config,
    error::DashboardError,
    model::WeatherSnapshot,
    params::{ApiKey, Location},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of current conditions and forecast for one render.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(
        &self,
        location: &Location,
        api_key: &ApiKey,
    ) -> Result<WeatherSnapshot, DashboardError>;
}

/// Construct the OpenWeather provider, honoring a configured base URL.
pub fn provider_from_config(config: &Config) -> Box<dyn WeatherProvider> {
    Box::new(OpenWeatherProvider::with_base_url(config.openweather_base_url()))
}
