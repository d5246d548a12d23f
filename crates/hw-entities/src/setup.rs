//! Config entry lifecycle
//!
//! `setup_entry` turns a persisted config entry into a running integration:
//! one API client, the shared data sources, the sensor and weather entities
//! and the three poll loops. `remove_entry` cleans up the signing keys a
//! token-auth entry left on disk.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::info;

use hw_api::{
    spawn_updater, AirQualityData, ApiClient, ApiError, Credentials, DailyForecastData,
    HourlyForecastData, ObservationData, SuggestionData, WarningData, FORECAST_INTERVAL,
    OBSERVATION_INTERVAL, SUGGESTION_INTERVAL,
};
use hw_cert::{ensure_store, CertStoreError};
use hw_config_flow::EntryData;
use hw_core::config::DEFAULT_DISASTER_LEVEL;
use hw_core::MessageMode;

use crate::sensor::{SensorKind, WeatherSensor};
use crate::weather::WeatherEntity;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] CertStoreError),
}

/// Shared state behind the poll loops.
struct Shared {
    client: ApiClient,
    observation: RwLock<ObservationData>,
    air: RwLock<AirQualityData>,
    warnings: RwLock<WarningData>,
    daily: RwLock<DailyForecastData>,
    hourly: RwLock<HourlyForecastData>,
    suggestions: RwLock<SuggestionData>,
    sensors: RwLock<Vec<WeatherSensor>>,
    weather: RwLock<WeatherEntity>,
}

impl Shared {
    /// Re-derive the sensor states from the current source data.
    async fn refresh_sensors(&self) {
        let observation = self.observation.read().await;
        let air = self.air.read().await;
        let warnings = self.warnings.read().await;
        let suggestions = self.suggestions.read().await;
        for sensor in self.sensors.write().await.iter_mut() {
            sensor.refresh(&observation, &air, &warnings, &suggestions);
        }
    }

    async fn refresh_weather(&self) {
        let observation = self.observation.read().await;
        let daily = self.daily.read().await;
        let hourly = self.hourly.read().await;
        self.weather
            .write()
            .await
            .refresh(&observation, &daily, &hourly);
    }
}

/// A running config entry: its entities plus the poll loops feeding them.
pub struct Integration {
    shared: Arc<Shared>,
    tasks: Vec<JoinHandle<()>>,
}

impl Integration {
    /// Snapshot of every sensor entity.
    pub async fn sensors(&self) -> Vec<WeatherSensor> {
        self.shared.sensors.read().await.clone()
    }

    /// Snapshot of the weather entity.
    pub async fn weather(&self) -> WeatherEntity {
        self.shared.weather.read().await.clone()
    }

    /// Stop the poll loops. Called on entry unload.
    pub fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for Integration {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn disaster_level(entry: &EntryData) -> u8 {
    entry
        .disaster_level
        .parse()
        .unwrap_or_else(|_| DEFAULT_DISASTER_LEVEL.parse().unwrap())
}

async fn credentials(entry: &EntryData) -> Result<Credentials, CertStoreError> {
    if entry.uses_token_auth() {
        let store = ensure_store(&entry.storage_path).await?;
        Ok(Credentials::Jwt {
            store,
            sub: entry.jwt_sub.clone(),
            kid: entry.jwt_kid.clone(),
        })
    } else {
        Ok(Credentials::ApiKey(entry.key.clone()))
    }
}

/// Bring a config entry up: build the client and entities, then start the
/// observation, forecast and suggestion poll loops.
pub async fn setup_entry(entry: &EntryData) -> Result<Integration, SetupError> {
    let location = entry.location();
    let client = ApiClient::new(&entry.host, &location, credentials(entry).await?)?;

    let sensors = SensorKind::ALL
        .iter()
        .map(|kind| WeatherSensor::new(*kind, &location))
        .collect();

    let shared = Arc::new(Shared {
        client,
        observation: RwLock::new(ObservationData::default()),
        air: RwLock::new(AirQualityData::default()),
        warnings: RwLock::new(WarningData::new(
            disaster_level(entry),
            MessageMode::from_config(&entry.disaster_msg),
        )),
        daily: RwLock::new(DailyForecastData::default()),
        hourly: RwLock::new(HourlyForecastData::default()),
        suggestions: RwLock::new(SuggestionData::default()),
        sensors: RwLock::new(sensors),
        weather: RwLock::new(WeatherEntity::new(&location)),
    });

    // Each poll fetches into a local copy and only takes the write lock to
    // swap it in, so entity snapshots never wait out an HTTP request.
    let observed = Arc::clone(&shared);
    let observation_task = spawn_updater("observation", OBSERVATION_INTERVAL, move || {
        let shared = Arc::clone(&observed);
        async move {
            let mut observation = shared.observation.read().await.clone();
            observation.update(&shared.client).await?;
            *shared.observation.write().await = observation;

            let mut air = shared.air.read().await.clone();
            air.update(&shared.client).await?;
            *shared.air.write().await = air;

            let mut warnings = shared.warnings.read().await.clone();
            warnings.update(&shared.client).await?;
            *shared.warnings.write().await = warnings;

            shared.refresh_sensors().await;
            shared.refresh_weather().await;
            Ok(())
        }
    });

    let forecast = Arc::clone(&shared);
    let forecast_task = spawn_updater("forecast", FORECAST_INTERVAL, move || {
        let shared = Arc::clone(&forecast);
        async move {
            let mut daily = shared.daily.read().await.clone();
            daily.update(&shared.client).await?;
            *shared.daily.write().await = daily;

            let mut hourly = shared.hourly.read().await.clone();
            hourly.update(&shared.client).await?;
            *shared.hourly.write().await = hourly;

            shared.refresh_weather().await;
            Ok(())
        }
    });

    let suggested = Arc::clone(&shared);
    let suggestion_task = spawn_updater("suggestions", SUGGESTION_INTERVAL, move || {
        let shared = Arc::clone(&suggested);
        async move {
            let mut suggestions = shared.suggestions.read().await.clone();
            suggestions.update(&shared.client).await?;
            *shared.suggestions.write().await = suggestions;

            shared.refresh_sensors().await;
            Ok(())
        }
    });

    info!(location = %location, "config entry set up");
    Ok(Integration {
        shared,
        tasks: vec![observation_task, forecast_task, suggestion_task],
    })
}

/// Remove a config entry's on-disk state. Key-auth entries have none; for
/// token-auth entries the signing key pair is deleted.
pub async fn remove_entry(entry: &EntryData) -> Result<(), CertStoreError> {
    if !entry.uses_token_auth() {
        return Ok(());
    }
    let store = ensure_store(&entry.storage_path).await?;
    store.destroy().await;
    info!(path = %entry.storage_path, "signing keys removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(auth_method: &str, storage_path: &str) -> EntryData {
        EntryData {
            auth_method: auth_method.to_string(),
            key: "k".to_string(),
            storage_path: storage_path.to_string(),
            jwt_sub: "project".to_string(),
            jwt_kid: "kid".to_string(),
            host: "devapi.qweather.com".to_string(),
            longitude: "116.40".to_string(),
            latitude: "39.90".to_string(),
            disaster_level: "3".to_string(),
            disaster_msg: "allmsg".to_string(),
        }
    }

    #[tokio::test]
    async fn test_setup_creates_all_entities() {
        let mut integration = setup_entry(&entry("key", "")).await.unwrap();

        assert_eq!(integration.sensors().await.len(), SensorKind::ALL.len());
        assert_eq!(
            integration.weather().await.unique_id,
            "localweather_116.40,39.90"
        );
        integration.shutdown();
    }

    #[tokio::test]
    async fn test_snapshots_stay_responsive_during_poll() {
        use std::time::Duration;

        // A black-hole host keeps the first poll cycle in flight for the
        // full request timeout.
        let mut data = entry("key", "");
        data.host = "203.0.113.1".to_string();
        let mut integration = setup_entry(&data).await.unwrap();

        let weather = tokio::time::timeout(Duration::from_secs(2), integration.weather())
            .await
            .expect("snapshot waited out an in-flight poll");
        assert_eq!(weather.unique_id, "localweather_116.40,39.90");

        let sensors = tokio::time::timeout(Duration::from_secs(2), integration.sensors())
            .await
            .expect("snapshot waited out an in-flight poll");
        assert_eq!(sensors.len(), SensorKind::ALL.len());

        integration.shutdown();
    }

    #[tokio::test]
    async fn test_remove_entry_deletes_signing_keys() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_str().unwrap().to_string();

        let store = ensure_store(&root).await.unwrap();
        assert!(store.generate_keys().await);
        assert!(store.private_key_pem().await.is_some());

        remove_entry(&entry("jwt", &root)).await.unwrap();
        assert!(store.private_key_pem().await.is_none());
        assert!(store.public_key_pem().await.is_none());
    }

    #[tokio::test]
    async fn test_remove_entry_noop_for_key_auth() {
        remove_entry(&entry("key", "/nonexistent/never-created"))
            .await
            .unwrap();
    }
}
