//! Sensor entities
//!
//! One sensor per vendor datum. Each kind carries static metadata (object
//! id, display name, icon, unit) and `refresh` copies the matching field
//! from the shared data sources.

use hw_api::{AirQualityData, ObservationData, SuggestionData, WarningData};
use hw_api::sources::Suggestion;
use hw_core::units;

/// Every sensor the integration creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Temperature,
    Humidity,
    FeelsLike,
    ConditionText,
    Precipitation,
    WindDir,
    WindScale,
    WindSpeed,
    DewPoint,
    Pressure,
    Visibility,
    Cloud,
    AirPrimary,
    AirCategory,
    AirLevel,
    Pm25,
    Pm10,
    No2,
    So2,
    Co,
    O3,
    Aqi,
    DisasterWarn,
    SuggestionAirPollution,
    SuggestionComfort,
    SuggestionCarWash,
    SuggestionDressing,
    SuggestionFlu,
    SuggestionSport,
    SuggestionTravel,
    SuggestionUv,
    SuggestionAllergy,
    SuggestionAirConditioner,
    SuggestionSunglasses,
    SuggestionSunProtection,
    SuggestionDrying,
    SuggestionTraffic,
}

/// Static display metadata for a sensor kind.
#[derive(Debug, Clone, Copy)]
pub struct SensorMeta {
    pub object_id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub unit: &'static str,
}

impl SensorKind {
    pub const ALL: [SensorKind; 37] = [
        SensorKind::Temperature,
        SensorKind::Humidity,
        SensorKind::FeelsLike,
        SensorKind::ConditionText,
        SensorKind::Precipitation,
        SensorKind::WindDir,
        SensorKind::WindScale,
        SensorKind::WindSpeed,
        SensorKind::DewPoint,
        SensorKind::Pressure,
        SensorKind::Visibility,
        SensorKind::Cloud,
        SensorKind::AirPrimary,
        SensorKind::AirCategory,
        SensorKind::AirLevel,
        SensorKind::Pm25,
        SensorKind::Pm10,
        SensorKind::No2,
        SensorKind::So2,
        SensorKind::Co,
        SensorKind::O3,
        SensorKind::Aqi,
        SensorKind::DisasterWarn,
        SensorKind::SuggestionAirPollution,
        SensorKind::SuggestionComfort,
        SensorKind::SuggestionCarWash,
        SensorKind::SuggestionDressing,
        SensorKind::SuggestionFlu,
        SensorKind::SuggestionSport,
        SensorKind::SuggestionTravel,
        SensorKind::SuggestionUv,
        SensorKind::SuggestionAllergy,
        SensorKind::SuggestionAirConditioner,
        SensorKind::SuggestionSunglasses,
        SensorKind::SuggestionSunProtection,
        SensorKind::SuggestionDrying,
        SensorKind::SuggestionTraffic,
    ];

    pub fn meta(self) -> SensorMeta {
        use SensorKind::*;
        match self {
            Temperature => SensorMeta {
                object_id: "heweather_temperature",
                name: "室外温度",
                icon: "mdi:thermometer",
                unit: units::TEMP_CELSIUS,
            },
            Humidity => SensorMeta {
                object_id: "heweather_humidity",
                name: "室外湿度",
                icon: "mdi:water-percent",
                unit: units::PERCENTAGE,
            },
            FeelsLike => SensorMeta {
                object_id: "heweather_feels_like",
                name: "体感温度",
                icon: "mdi:thermometer",
                unit: units::TEMP_CELSIUS,
            },
            ConditionText => SensorMeta {
                object_id: "heweather_text",
                name: "天气描述",
                icon: "mdi:thermometer",
                unit: units::NO_UNIT,
            },
            Precipitation => SensorMeta {
                object_id: "heweather_precip",
                name: "小时降水量",
                icon: "mdi:weather-rainy",
                unit: units::PRECIPITATION_MILLIMETERS_PER_HOUR,
            },
            WindDir => SensorMeta {
                object_id: "heweather_wind_dir",
                name: "风向",
                icon: "mdi:windsock",
                unit: units::NO_UNIT,
            },
            WindScale => SensorMeta {
                object_id: "heweather_wind_scale",
                name: "风力等级",
                icon: "mdi:weather-windy",
                unit: units::NO_UNIT,
            },
            WindSpeed => SensorMeta {
                object_id: "heweather_wind_speed",
                name: "风速",
                icon: "mdi:weather-windy",
                unit: units::SPEED_KILOMETERS_PER_HOUR,
            },
            DewPoint => SensorMeta {
                object_id: "heweather_dew",
                name: "露点温度",
                icon: "mdi:thermometer-water",
                unit: units::NO_UNIT,
            },
            Pressure => SensorMeta {
                object_id: "heweather_pressure",
                name: "大气压强",
                icon: "mdi:thermometer",
                unit: units::PRESSURE_HPA,
            },
            Visibility => SensorMeta {
                object_id: "heweather_vis",
                name: "能见度",
                icon: "mdi:thermometer",
                unit: units::LENGTH_KILOMETERS,
            },
            Cloud => SensorMeta {
                object_id: "heweather_cloud",
                name: "云量",
                icon: "mdi:cloud-percent",
                unit: units::PERCENTAGE,
            },
            AirPrimary => SensorMeta {
                object_id: "heweather_primary",
                name: "空气质量的主要污染物",
                icon: "mdi:weather-dust",
                unit: units::NO_UNIT,
            },
            AirCategory => SensorMeta {
                object_id: "heweather_category",
                name: "空气质量指数级别",
                icon: "mdi:walk",
                unit: units::NO_UNIT,
            },
            AirLevel => SensorMeta {
                object_id: "heweather_level",
                name: "空气质量指数等级",
                icon: "mdi:walk",
                unit: units::NO_UNIT,
            },
            Pm25 => SensorMeta {
                object_id: "heweather_pm25",
                name: "PM2.5",
                icon: "mdi:walk",
                unit: units::CONCENTRATION_MICROGRAMS_PER_CUBIC_METER,
            },
            Pm10 => SensorMeta {
                object_id: "heweather_pm10",
                name: "PM10",
                icon: "mdi:walk",
                unit: units::CONCENTRATION_MICROGRAMS_PER_CUBIC_METER,
            },
            No2 => SensorMeta {
                object_id: "heweather_no2",
                name: "二氧化氮",
                icon: "mdi:emoticon-dead",
                unit: units::CONCENTRATION_MICROGRAMS_PER_CUBIC_METER,
            },
            So2 => SensorMeta {
                object_id: "heweather_so2",
                name: "二氧化硫",
                icon: "mdi:emoticon-dead",
                unit: units::CONCENTRATION_MICROGRAMS_PER_CUBIC_METER,
            },
            Co => SensorMeta {
                object_id: "heweather_co",
                name: "一氧化碳",
                icon: "mdi:molecule-co",
                unit: units::CONCENTRATION_MICROGRAMS_PER_CUBIC_METER,
            },
            O3 => SensorMeta {
                object_id: "heweather_o3",
                name: "臭氧",
                icon: "mdi:weather-cloudy",
                unit: units::CONCENTRATION_MICROGRAMS_PER_CUBIC_METER,
            },
            Aqi => SensorMeta {
                object_id: "heweather_qlty",
                name: "综合空气质量",
                icon: "mdi:quality-high",
                unit: units::NO_UNIT,
            },
            DisasterWarn => SensorMeta {
                object_id: "heweather_disaster_warn",
                name: "灾害预警",
                icon: "mdi:alert",
                unit: units::NO_UNIT,
            },
            SuggestionAirPollution => SensorMeta {
                object_id: "suggestion_air",
                name: "空气污染扩散条件指数",
                icon: "mdi:air-conditioner",
                unit: units::NO_UNIT,
            },
            SuggestionComfort => SensorMeta {
                object_id: "suggestion_comf",
                name: "舒适度指数",
                icon: "mdi:human-greeting",
                unit: units::NO_UNIT,
            },
            SuggestionCarWash => SensorMeta {
                object_id: "suggestion_cw",
                name: "洗车指数",
                icon: "mdi:car",
                unit: units::NO_UNIT,
            },
            SuggestionDressing => SensorMeta {
                object_id: "suggestion_drsg",
                name: "穿衣指数",
                icon: "mdi:hanger",
                unit: units::NO_UNIT,
            },
            SuggestionFlu => SensorMeta {
                object_id: "suggestion_flu",
                name: "感冒指数",
                icon: "mdi:biohazard",
                unit: units::NO_UNIT,
            },
            SuggestionSport => SensorMeta {
                object_id: "suggestion_sport",
                name: "运动指数",
                icon: "mdi:badminton",
                unit: units::NO_UNIT,
            },
            SuggestionTravel => SensorMeta {
                object_id: "suggestion_trav",
                name: "旅行指数",
                icon: "mdi:wallet-travel",
                unit: units::NO_UNIT,
            },
            SuggestionUv => SensorMeta {
                object_id: "suggestion_uv",
                name: "紫外线指数",
                icon: "mdi:weather-sun-wireless",
                unit: units::NO_UNIT,
            },
            SuggestionAllergy => SensorMeta {
                object_id: "suggestion_guomin",
                name: "过敏指数",
                icon: "mdi:sunglasses",
                unit: units::NO_UNIT,
            },
            SuggestionAirConditioner => SensorMeta {
                object_id: "suggestion_kongtiao",
                name: "空调开启指数",
                icon: "mdi:air-conditioner",
                unit: units::NO_UNIT,
            },
            SuggestionSunglasses => SensorMeta {
                object_id: "suggestion_sunglass",
                name: "太阳镜指数",
                icon: "mdi:sunglasses",
                unit: units::NO_UNIT,
            },
            SuggestionSunProtection => SensorMeta {
                object_id: "suggestion_fangshai",
                name: "防晒指数",
                icon: "mdi:sun-protection-outline",
                unit: units::NO_UNIT,
            },
            SuggestionDrying => SensorMeta {
                object_id: "suggestion_liangshai",
                name: "晾晒指数",
                icon: "mdi:tshirt-crew-outline",
                unit: units::NO_UNIT,
            },
            SuggestionTraffic => SensorMeta {
                object_id: "suggestion_jiaotong",
                name: "交通指数",
                icon: "mdi:train-car",
                unit: units::NO_UNIT,
            },
        }
    }
}

/// Format a numeric state without a trailing `.0` for whole values.
fn fmt_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn num_state(value: Option<f64>) -> Option<String> {
    value.map(fmt_value)
}

/// A single sensor entity.
#[derive(Debug, Clone)]
pub struct WeatherSensor {
    kind: SensorKind,
    pub unique_id: String,
    pub state: Option<String>,
    /// Extra `states` attribute (warning summaries, suggestion texts).
    pub states_attr: Option<String>,
    pub update_time: Option<String>,
}

impl WeatherSensor {
    pub fn new(kind: SensorKind, location: &str) -> Self {
        Self {
            kind,
            unique_id: format!("{}{}", kind.meta().object_id, location),
            state: None,
            states_attr: None,
            update_time: None,
        }
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn meta(&self) -> SensorMeta {
        self.kind.meta()
    }

    fn apply_suggestion(&mut self, suggestion: Option<&Suggestion>) {
        self.state = suggestion.map(|s| s.category.clone());
        self.states_attr = suggestion.map(|s| s.text.clone());
    }

    /// Copy this sensor's field from the shared data sources.
    pub fn refresh(
        &mut self,
        observation: &ObservationData,
        air: &AirQualityData,
        warnings: &WarningData,
        suggestions: &SuggestionData,
    ) {
        self.update_time = observation.update_time.clone();
        match self.kind {
            SensorKind::Temperature => self.state = num_state(observation.temperature),
            SensorKind::Humidity => self.state = num_state(observation.humidity),
            SensorKind::FeelsLike => self.state = num_state(observation.feels_like),
            SensorKind::ConditionText => self.state = observation.text.clone(),
            SensorKind::Precipitation => self.state = num_state(observation.precip),
            SensorKind::WindDir => self.state = observation.wind_dir.clone(),
            SensorKind::WindScale => self.state = observation.wind_scale.clone(),
            SensorKind::WindSpeed => self.state = num_state(observation.wind_speed),
            SensorKind::DewPoint => self.state = num_state(observation.dew),
            SensorKind::Pressure => self.state = num_state(observation.pressure),
            SensorKind::Visibility => self.state = num_state(observation.visibility),
            SensorKind::Cloud => self.state = num_state(observation.cloud),
            SensorKind::AirPrimary => self.state = air.primary.clone(),
            SensorKind::AirCategory => self.state = air.category.clone(),
            SensorKind::AirLevel => self.state = air.level.clone(),
            SensorKind::Pm25 => self.state = num_state(air.pm2p5),
            SensorKind::Pm10 => self.state = num_state(air.pm10),
            SensorKind::No2 => self.state = num_state(air.no2),
            SensorKind::So2 => self.state = num_state(air.so2),
            SensorKind::Co => self.state = num_state(air.co),
            SensorKind::O3 => self.state = num_state(air.o3),
            SensorKind::Aqi => self.state = num_state(air.aqi),
            SensorKind::DisasterWarn => {
                let summary = warnings.summary.clone().unwrap_or_default();
                // Short summaries are the "nothing qualifying" fallback.
                self.state = Some(if summary.chars().count() > 10 {
                    "on".to_string()
                } else {
                    "off".to_string()
                });
                self.states_attr = Some(summary);
            }
            SensorKind::SuggestionAirPollution => {
                self.apply_suggestion(suggestions.air_pollution.as_ref())
            }
            SensorKind::SuggestionComfort => self.apply_suggestion(suggestions.comfort.as_ref()),
            SensorKind::SuggestionCarWash => self.apply_suggestion(suggestions.car_wash.as_ref()),
            SensorKind::SuggestionDressing => self.apply_suggestion(suggestions.dressing.as_ref()),
            SensorKind::SuggestionFlu => self.apply_suggestion(suggestions.flu.as_ref()),
            SensorKind::SuggestionSport => self.apply_suggestion(suggestions.sport.as_ref()),
            SensorKind::SuggestionTravel => self.apply_suggestion(suggestions.travel.as_ref()),
            SensorKind::SuggestionUv => self.apply_suggestion(suggestions.uv.as_ref()),
            SensorKind::SuggestionAllergy => self.apply_suggestion(suggestions.allergy.as_ref()),
            SensorKind::SuggestionAirConditioner => {
                self.apply_suggestion(suggestions.air_conditioner.as_ref())
            }
            SensorKind::SuggestionSunglasses => {
                self.apply_suggestion(suggestions.sunglasses.as_ref())
            }
            SensorKind::SuggestionSunProtection => {
                self.apply_suggestion(suggestions.sun_protection.as_ref())
            }
            SensorKind::SuggestionDrying => self.apply_suggestion(suggestions.drying.as_ref()),
            SensorKind::SuggestionTraffic => self.apply_suggestion(suggestions.traffic.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hw_core::MessageMode;

    fn sources() -> (ObservationData, AirQualityData, WarningData, SuggestionData) {
        let observation = ObservationData {
            temperature: Some(21.0),
            humidity: Some(40.0),
            feels_like: Some(23.5),
            text: Some("晴".to_string()),
            wind_dir: Some("东南风".to_string()),
            update_time: Some("2024-03-01T12:00+08:00".to_string()),
            ..Default::default()
        };
        let air = AirQualityData {
            aqi: Some(74.0),
            pm2p5: Some(54.0),
            category: Some("良".to_string()),
            ..Default::default()
        };
        let warnings = WarningData::new(3, MessageMode::Full);
        let suggestions = SuggestionData {
            sport: Some(Suggestion {
                category: "适宜".to_string(),
                text: "天气不错，适宜运动".to_string(),
            }),
            ..Default::default()
        };
        (observation, air, warnings, suggestions)
    }

    #[test]
    fn test_observation_sensor_refresh() {
        let (observation, air, warnings, suggestions) = sources();

        let mut sensor = WeatherSensor::new(SensorKind::Temperature, "116.40,39.90");
        sensor.refresh(&observation, &air, &warnings, &suggestions);
        assert_eq!(sensor.state.as_deref(), Some("21"));
        assert_eq!(sensor.update_time.as_deref(), Some("2024-03-01T12:00+08:00"));

        let mut sensor = WeatherSensor::new(SensorKind::FeelsLike, "116.40,39.90");
        sensor.refresh(&observation, &air, &warnings, &suggestions);
        assert_eq!(sensor.state.as_deref(), Some("23.5"));

        let mut sensor = WeatherSensor::new(SensorKind::Aqi, "116.40,39.90");
        sensor.refresh(&observation, &air, &warnings, &suggestions);
        assert_eq!(sensor.state.as_deref(), Some("74"));
    }

    #[test]
    fn test_suggestion_sensor_exposes_category_and_text() {
        let (observation, air, warnings, suggestions) = sources();

        let mut sensor = WeatherSensor::new(SensorKind::SuggestionSport, "loc");
        sensor.refresh(&observation, &air, &warnings, &suggestions);
        assert_eq!(sensor.state.as_deref(), Some("适宜"));
        assert_eq!(sensor.states_attr.as_deref(), Some("天气不错，适宜运动"));

        let mut sensor = WeatherSensor::new(SensorKind::SuggestionUv, "loc");
        sensor.refresh(&observation, &air, &warnings, &suggestions);
        assert_eq!(sensor.state, None);
    }

    #[test]
    fn test_disaster_sensor_on_off() {
        let (observation, air, mut warnings, suggestions) = sources();

        warnings.summary = Some("近日无3级及以上灾害".to_string());
        let mut sensor = WeatherSensor::new(SensorKind::DisasterWarn, "loc");
        sensor.refresh(&observation, &air, &warnings, &suggestions);
        assert_eq!(sensor.state.as_deref(), Some("off"));

        warnings.summary = Some("暴雨橙色预警:未来六小时将出现暴雨||".to_string());
        sensor.refresh(&observation, &air, &warnings, &suggestions);
        assert_eq!(sensor.state.as_deref(), Some("on"));
        assert!(sensor.states_attr.as_deref().unwrap().contains("暴雨橙色预警"));
    }

    #[test]
    fn test_unique_ids_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for kind in SensorKind::ALL {
            assert!(seen.insert(WeatherSensor::new(kind, "loc").unique_id));
        }
    }
}
