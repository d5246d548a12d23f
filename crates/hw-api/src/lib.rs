//! Vendor REST client and polling data sources
//!
//! Talks to the HeWeather v7 API and flattens its JSON payloads into the
//! plain fields the entity layer reads:
//!
//! - [`ApiClient`] - host + credentials + timeout; static API key or a
//!   fresh bearer token per request
//! - [`sources`] - one updatable struct per endpoint (observation, air
//!   quality, warnings, daily/hourly forecast, life suggestions)
//! - [`updater`] - interval-driven refresh loop; a failed cycle is logged
//!   and retried on the next tick

pub mod client;
pub mod sources;
pub mod types;
pub mod updater;

pub use client::{ApiClient, ApiError, ApiResult, Credentials};
pub use sources::{
    AirQualityData, DailyForecastData, HourlyForecastData, ObservationData, SuggestionData,
    WarningData,
};
pub use updater::{
    spawn_updater, FORECAST_INTERVAL, OBSERVATION_INTERVAL, SUGGESTION_INTERVAL,
};
