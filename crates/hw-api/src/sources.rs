//! Polling data sources
//!
//! One struct per endpoint. `update` fetches and flattens the payload into
//! plain fields; entities copy those fields on their own refresh. Parsing
//! is per-field, so one malformed value leaves the other fields intact.

use serde::Serialize;
use tracing::debug;

use hw_core::{severity_rank, Condition, MessageMode};

use crate::client::{ApiClient, ApiResult};
use crate::types::{
    AirNowResponse, AirObservation, DailyEntry, DailyResponse, HourlyEntry, HourlyResponse,
    IndexEntry, IndicesResponse, NowResponse, Observation, Warning, WarningResponse,
};

/// Days carried by the daily forecast source.
pub const DAILY_FORECAST_DAYS: usize = 7;
/// Hours carried by the hourly forecast source.
pub const HOURLY_FORECAST_HOURS: usize = 24;

fn parse_num(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

fn parse_opt(value: Option<&String>) -> Option<f64> {
    value.and_then(|value| parse_num(value))
}

/// Current observed conditions from `/v7/weather/now`.
#[derive(Debug, Clone, Default)]
pub struct ObservationData {
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub text: Option<String>,
    pub wind_dir: Option<String>,
    pub wind_scale: Option<String>,
    pub wind_speed: Option<f64>,
    pub humidity: Option<f64>,
    pub precip: Option<f64>,
    pub pressure: Option<f64>,
    pub visibility: Option<f64>,
    pub cloud: Option<f64>,
    pub dew: Option<f64>,
    pub update_time: Option<String>,
}

impl ObservationData {
    pub async fn update(&mut self, client: &ApiClient) -> ApiResult<()> {
        let response: NowResponse = client.fetch("/v7/weather/now", &[]).await?;
        self.apply(response.now);
        Ok(())
    }

    pub(crate) fn apply(&mut self, now: Observation) {
        self.temperature = parse_num(&now.temp);
        self.feels_like = parse_num(&now.feels_like);
        self.wind_speed = parse_num(&now.wind_speed);
        self.humidity = parse_num(&now.humidity);
        self.precip = parse_num(&now.precip);
        self.pressure = parse_num(&now.pressure);
        self.visibility = parse_num(&now.vis);
        self.cloud = parse_opt(now.cloud.as_ref());
        self.dew = parse_opt(now.dew.as_ref());
        self.text = Some(now.text);
        self.wind_dir = Some(now.wind_dir);
        self.wind_scale = Some(now.wind_scale);
        self.update_time = Some(now.obs_time);
    }

    /// Platform condition for the observed vendor text.
    pub fn condition(&self) -> Option<Condition> {
        Condition::from_vendor_text(self.text.as_deref()?)
    }
}

/// Air quality from `/v7/air/now`.
#[derive(Debug, Clone, Default)]
pub struct AirQualityData {
    pub aqi: Option<f64>,
    pub level: Option<String>,
    pub category: Option<String>,
    pub primary: Option<String>,
    pub pm2p5: Option<f64>,
    pub pm10: Option<f64>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
    pub co: Option<f64>,
    pub o3: Option<f64>,
}

impl AirQualityData {
    pub async fn update(&mut self, client: &ApiClient) -> ApiResult<()> {
        let response: AirNowResponse = client.fetch("/v7/air/now", &[]).await?;
        self.apply(response.now);
        Ok(())
    }

    pub(crate) fn apply(&mut self, now: AirObservation) {
        self.aqi = parse_num(&now.aqi);
        self.pm2p5 = parse_num(&now.pm2p5);
        self.pm10 = parse_num(&now.pm10);
        self.no2 = parse_num(&now.no2);
        self.so2 = parse_num(&now.so2);
        self.co = parse_num(&now.co);
        self.o3 = parse_num(&now.o3);
        self.level = Some(now.level);
        self.category = Some(now.category);
        self.primary = Some(now.primary);
    }
}

/// Disaster warnings from `/v7/warning/now`, filtered by the configured
/// minimum severity and rendered per the configured message mode.
#[derive(Debug, Clone)]
pub struct WarningData {
    min_level: u8,
    mode: MessageMode,
    pub summary: Option<String>,
}

impl WarningData {
    pub fn new(min_level: u8, mode: MessageMode) -> Self {
        Self {
            min_level,
            mode,
            summary: None,
        }
    }

    pub async fn update(&mut self, client: &ApiClient) -> ApiResult<()> {
        let response: WarningResponse = client.fetch("/v7/warning/now", &[]).await?;
        self.apply(response.warning);
        Ok(())
    }

    pub(crate) fn apply(&mut self, warnings: Vec<Warning>) {
        let mut full = String::new();
        let mut titles = String::new();
        for warning in &warnings {
            if severity_rank(&warning.severity) < self.min_level {
                continue;
            }
            full.push_str(&warning.title);
            full.push(':');
            full.push_str(&warning.text);
            full.push_str("||");
            titles.push_str(&warning.title);
            titles.push_str("||");
        }

        // A summary this short means nothing qualified.
        self.summary = Some(if titles.chars().count() < 5 {
            format!("近日无{}级及以上灾害", self.min_level)
        } else if self.mode == MessageMode::Title {
            titles
        } else {
            full
        });
        debug!(count = warnings.len(), "applied warning payload");
    }
}

/// One day of the 7-day forecast.
#[derive(Debug, Clone, Serialize)]
pub struct DailyForecast {
    pub date: String,
    pub condition: Option<Condition>,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
}

/// Daily forecast from `/v7/weather/7d`.
#[derive(Debug, Clone, Default)]
pub struct DailyForecastData {
    pub days: Vec<DailyForecast>,
}

impl DailyForecastData {
    pub async fn update(&mut self, client: &ApiClient) -> ApiResult<()> {
        let response: DailyResponse = client.fetch("/v7/weather/7d", &[]).await?;
        self.apply(response.daily);
        Ok(())
    }

    pub(crate) fn apply(&mut self, daily: Vec<DailyEntry>) {
        self.days = daily
            .into_iter()
            .take(DAILY_FORECAST_DAYS)
            .map(|entry| DailyForecast {
                condition: Condition::from_vendor_text(&entry.text_day),
                temp_max: parse_num(&entry.temp_max),
                temp_min: parse_num(&entry.temp_min),
                date: entry.fx_date,
            })
            .collect();
    }
}

/// One hour of the 24-hour forecast.
#[derive(Debug, Clone, Serialize)]
pub struct HourForecast {
    pub time: String,
    pub condition: Option<Condition>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub precip: Option<f64>,
    pub wind_dir: Option<String>,
    pub wind_speed: Option<f64>,
    pub precip_probability: Option<f64>,
}

/// Hourly forecast from `/v7/weather/24h`.
#[derive(Debug, Clone, Default)]
pub struct HourlyForecastData {
    pub hours: Vec<HourForecast>,
}

impl HourlyForecastData {
    pub async fn update(&mut self, client: &ApiClient) -> ApiResult<()> {
        let response: HourlyResponse = client.fetch("/v7/weather/24h", &[]).await?;
        self.apply(response.hourly);
        Ok(())
    }

    pub(crate) fn apply(&mut self, hourly: Vec<HourlyEntry>) {
        self.hours = hourly
            .into_iter()
            .take(HOURLY_FORECAST_HOURS)
            .map(|entry| HourForecast {
                condition: Condition::from_vendor_text(&entry.text),
                temperature: parse_num(&entry.temp),
                humidity: parse_num(&entry.humidity),
                precip: parse_num(&entry.precip),
                wind_speed: parse_num(&entry.wind_speed),
                precip_probability: parse_num(&entry.pop),
                wind_dir: Some(entry.wind_dir),
                time: entry.fx_time,
            })
            .collect();
    }
}

/// A life-suggestion index value: category plus advisory text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub category: String,
    pub text: String,
}

/// Life-suggestion indices from `/v7/indices/1d` (`type=0` requests all).
#[derive(Debug, Clone, Default)]
pub struct SuggestionData {
    pub sport: Option<Suggestion>,
    pub car_wash: Option<Suggestion>,
    pub dressing: Option<Suggestion>,
    pub uv: Option<Suggestion>,
    pub travel: Option<Suggestion>,
    pub allergy: Option<Suggestion>,
    pub comfort: Option<Suggestion>,
    pub flu: Option<Suggestion>,
    pub air_pollution: Option<Suggestion>,
    pub air_conditioner: Option<Suggestion>,
    pub sunglasses: Option<Suggestion>,
    pub drying: Option<Suggestion>,
    pub traffic: Option<Suggestion>,
    pub sun_protection: Option<Suggestion>,
    pub update_time: Option<String>,
}

impl SuggestionData {
    pub async fn update(&mut self, client: &ApiClient) -> ApiResult<()> {
        let response: IndicesResponse = client.fetch("/v7/indices/1d", &[("type", "0")]).await?;
        self.update_time = Some(response.update_time);
        self.apply(response.daily);
        Ok(())
    }

    pub(crate) fn apply(&mut self, daily: Vec<IndexEntry>) {
        for entry in daily {
            let suggestion = Suggestion {
                category: entry.category,
                text: entry.text,
            };
            // Vendor index type codes.
            match entry.kind.as_str() {
                "1" => self.sport = Some(suggestion),
                "2" => self.car_wash = Some(suggestion),
                "3" => self.dressing = Some(suggestion),
                "5" => self.uv = Some(suggestion),
                "6" => self.travel = Some(suggestion),
                "7" => self.allergy = Some(suggestion),
                "8" => self.comfort = Some(suggestion),
                "9" => self.flu = Some(suggestion),
                "10" => self.air_pollution = Some(suggestion),
                "11" => self.air_conditioner = Some(suggestion),
                "12" => self.sunglasses = Some(suggestion),
                "14" => self.drying = Some(suggestion),
                "15" => self.traffic = Some(suggestion),
                "16" => self.sun_protection = Some(suggestion),
                _ => {}
            }
        }
    }
}
