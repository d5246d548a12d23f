//! Entity layer for the HeWeather integration
//!
//! Entities are read-only views over the polling data sources:
//!
//! - [`WeatherSensor`] - one sensor per [`SensorKind`], copying a single
//!   flat field (observation, air quality, warning summary or suggestion)
//! - [`WeatherEntity`] - the weather platform entity with daily and hourly
//!   forecast assembly
//! - [`setup_entry`] / [`remove_entry`] - entry lifecycle; removal deletes
//!   the Ed25519 key pair

pub mod sensor;
pub mod setup;
pub mod weather;

pub use sensor::{SensorKind, SensorMeta, WeatherSensor};
pub use setup::{remove_entry, setup_entry, Integration, SetupError};
pub use weather::WeatherEntity;
