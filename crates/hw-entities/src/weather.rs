//! Weather entity
//!
//! The single aggregated entity: current conditions plus the daily and
//! hourly forecasts, serialized in the shape the frontend consumes.

use serde::Serialize;

use hw_api::sources::{DailyForecast, HourForecast};
use hw_api::{DailyForecastData, HourlyForecastData, ObservationData};
use hw_core::config::{ATTRIBUTION, DEFAULT_NAME};
use hw_core::Condition;

#[derive(Debug, Clone, Serialize)]
pub struct WeatherEntity {
    pub unique_id: String,
    pub name: &'static str,
    pub attribution: &'static str,
    pub condition: Option<Condition>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_bearing: Option<String>,
    pub visibility: Option<f64>,
    pub precipitation: Option<f64>,
    pub feels_like: Option<f64>,
    pub dew_point: Option<f64>,
    pub cloud_coverage: Option<f64>,
    pub forecast_daily: Vec<DailyForecast>,
    pub forecast_hourly: Vec<HourForecast>,
    pub update_time: Option<String>,
}

impl WeatherEntity {
    pub fn new(location: &str) -> Self {
        Self {
            unique_id: format!("localweather_{location}"),
            name: DEFAULT_NAME,
            attribution: ATTRIBUTION,
            condition: None,
            temperature: None,
            humidity: None,
            pressure: None,
            wind_speed: None,
            wind_bearing: None,
            visibility: None,
            precipitation: None,
            feels_like: None,
            dew_point: None,
            cloud_coverage: None,
            forecast_daily: Vec::new(),
            forecast_hourly: Vec::new(),
            update_time: None,
        }
    }

    /// Copy current conditions and forecasts from the shared data sources.
    pub fn refresh(
        &mut self,
        observation: &ObservationData,
        daily: &DailyForecastData,
        hourly: &HourlyForecastData,
    ) {
        self.condition = observation.condition();
        self.temperature = observation.temperature;
        self.humidity = observation.humidity;
        self.pressure = observation.pressure;
        self.wind_speed = observation.wind_speed;
        self.wind_bearing = observation.wind_dir.clone();
        self.visibility = observation.visibility;
        self.precipitation = observation.precip;
        self.feels_like = observation.feels_like;
        self.dew_point = observation.dew;
        self.cloud_coverage = observation.cloud;
        self.forecast_daily = daily.days.clone();
        self.forecast_hourly = hourly.hours.clone();
        self.update_time = observation.update_time.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hw_api::sources::DailyForecast;

    #[test]
    fn test_refresh_copies_observation() {
        let observation = ObservationData {
            temperature: Some(18.0),
            humidity: Some(55.0),
            text: Some("阴".to_string()),
            wind_dir: Some("西北风".to_string()),
            update_time: Some("2024-03-01T12:00+08:00".to_string()),
            ..Default::default()
        };
        let daily = DailyForecastData {
            days: vec![DailyForecast {
                date: "2024-03-02".to_string(),
                condition: Some(Condition::Rainy),
                temp_max: Some(11.0),
                temp_min: Some(3.0),
            }],
        };
        let hourly = HourlyForecastData::default();

        let mut entity = WeatherEntity::new("116.40,39.90");
        entity.refresh(&observation, &daily, &hourly);

        assert_eq!(entity.unique_id, "localweather_116.40,39.90");
        assert_eq!(entity.condition, Some(Condition::PartlyCloudy));
        assert_eq!(entity.temperature, Some(18.0));
        assert_eq!(entity.wind_bearing.as_deref(), Some("西北风"));
        assert_eq!(entity.forecast_daily.len(), 1);
        assert!(entity.forecast_hourly.is_empty());
    }

    #[test]
    fn test_serializes_condition_keyword() {
        let mut entity = WeatherEntity::new("loc");
        entity.condition = Some(Condition::PartlyCloudy);

        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["condition"], "partlycloudy");
        assert_eq!(json["name"], DEFAULT_NAME);
    }
}
