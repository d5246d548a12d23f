//! Vendor v7 payload shapes
//!
//! The vendor encodes every numeric field as a string ("temp": "21");
//! parsing to numbers happens in the data sources, not here, so a single
//! unparsable field never sinks a whole payload.

use serde::Deserialize;

/// `/v7/weather/now`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NowResponse {
    pub update_time: String,
    pub now: Observation,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub obs_time: String,
    pub temp: String,
    pub feels_like: String,
    pub text: String,
    pub wind_dir: String,
    pub wind_scale: String,
    pub wind_speed: String,
    pub humidity: String,
    pub precip: String,
    pub pressure: String,
    pub vis: String,
    #[serde(default)]
    pub cloud: Option<String>,
    #[serde(default)]
    pub dew: Option<String>,
}

/// `/v7/air/now`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirNowResponse {
    pub now: AirObservation,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirObservation {
    pub aqi: String,
    pub level: String,
    pub category: String,
    pub primary: String,
    pub pm2p5: String,
    pub pm10: String,
    pub no2: String,
    pub so2: String,
    pub co: String,
    pub o3: String,
}

/// `/v7/warning/now`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningResponse {
    #[serde(default)]
    pub warning: Vec<Warning>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub title: String,
    pub text: String,
    pub severity: String,
}

/// `/v7/weather/7d`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyResponse {
    pub daily: Vec<DailyEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
    pub fx_date: String,
    pub text_day: String,
    pub temp_max: String,
    pub temp_min: String,
}

/// `/v7/weather/24h`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyResponse {
    pub hourly: Vec<HourlyEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyEntry {
    pub fx_time: String,
    pub text: String,
    pub temp: String,
    pub humidity: String,
    pub precip: String,
    pub wind_dir: String,
    pub wind_speed: String,
    pub pop: String,
}

/// `/v7/indices/1d`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicesResponse {
    pub update_time: String,
    pub daily: Vec<IndexEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub text: String,
}
