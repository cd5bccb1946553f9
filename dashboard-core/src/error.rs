use thiserror::Error;

/// Everything that can stop a dashboard from rendering.
///
/// Invalid request parameters that have a safe default never show up here;
/// they are normalized silently by [`crate::params`].
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("missing or invalid apikey parameter (expected 32 hex characters).")]
    MissingApiKey,

    #[error("no location given (use cityid, lat/lon, zip, city or q).")]
    MissingLocation,

    #[error("failed to fetch {what} from OpenWeather.")]
    Transport {
        what: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch {what} from OpenWeather (HTTP {status}).")]
    Status { what: &'static str, status: u16 },

    #[error("unexpected response from OpenWeather (invalid JSON).")]
    InvalidJson,

    #[error("{0}")]
    Upstream(String),

    #[error("unexpected response from OpenWeather (missing fields).")]
    MissingFields,
}

impl DashboardError {
    /// Errors caused by the caller's parameters rather than by OpenWeather.
    pub fn is_request_error(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::MissingLocation)
    }
}
