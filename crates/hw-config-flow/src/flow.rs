//! The wizard state machine
//!
//! Steps advance linearly; submitting invalid input re-renders the current
//! form with an error key. Only the token-auth branch touches the
//! certificate store, and only directory initialization can fail fatally.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use hw_cert::{ensure_store, CertStore, CertStoreError};
use hw_core::config::{
    DEFAULT_AUTH_METHOD, DEFAULT_DISASTER_LEVEL, DEFAULT_DISASTER_MSG, DEFAULT_HOST, DEFAULT_NAME,
};

use crate::entry::EntryData;

/// Wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStep {
    AuthMethod,
    ApiKey,
    JwtAuth,
    Location,
    Disaster,
}

/// A field rendered on a form, with its current default.
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: &'static str,
    pub default: String,
}

/// A form to show the user.
#[derive(Debug, Clone)]
pub struct FlowForm {
    pub step: FlowStep,
    pub fields: Vec<FormField>,
    /// Error key from the previous submission, if any.
    pub error: Option<&'static str>,
    /// Extra display values (the token path exposes `jwt_pubkey` here).
    pub placeholders: HashMap<&'static str, String>,
    pub last_step: bool,
}

/// Outcome of one wizard interaction.
#[derive(Debug, Clone)]
pub enum FlowResult {
    Form(FlowForm),
    CreateEntry { title: String, data: EntryData },
    Abort { reason: &'static str },
}

fn parse_longitude(value: &str) -> Option<f64> {
    let lon: f64 = value.trim().parse().ok()?;
    (-180.0..=180.0).contains(&lon).then_some(lon)
}

fn parse_latitude(value: &str) -> Option<f64> {
    let lat: f64 = value.trim().parse().ok()?;
    (-90.0..=90.0).contains(&lat).then_some(lat)
}

/// One in-progress setup wizard.
#[derive(Debug)]
pub struct ConfigFlow {
    flow_id: String,
    storage_root: PathBuf,
    existing_entries: usize,
    store: Option<Arc<CertStore>>,
    step: FlowStep,

    auth_method: String,
    host: String,
    key: String,
    jwt_sub: String,
    jwt_kid: String,
    jwt_pubkey: String,
    longitude: String,
    latitude: String,
    disaster_level: String,
    disaster_msg: String,
}

impl ConfigFlow {
    /// `existing_entries` is how many entries of this integration are
    /// already configured; more than zero aborts the flow.
    pub fn new(storage_root: impl Into<PathBuf>, existing_entries: usize) -> Self {
        let flow_id = ulid::Ulid::new().to_string();
        debug!(%flow_id, "starting config flow");
        Self {
            flow_id,
            storage_root: storage_root.into(),
            existing_entries,
            store: None,
            step: FlowStep::AuthMethod,
            auth_method: DEFAULT_AUTH_METHOD.to_string(),
            host: DEFAULT_HOST.to_string(),
            key: String::new(),
            jwt_sub: String::new(),
            jwt_kid: String::new(),
            jwt_pubkey: String::new(),
            longitude: String::new(),
            latitude: String::new(),
            disaster_level: DEFAULT_DISASTER_LEVEL.to_string(),
            disaster_msg: DEFAULT_DISASTER_MSG.to_string(),
        }
    }

    pub fn flow_id(&self) -> &str {
        &self.flow_id
    }

    /// Advance the wizard. `input` is the submission for the current step,
    /// or `None` on first render.
    pub async fn handle(
        &mut self,
        input: Option<HashMap<String, String>>,
    ) -> Result<FlowResult, CertStoreError> {
        if self.existing_entries > 0 {
            return Ok(FlowResult::Abort {
                reason: "single_instance_allowed",
            });
        }
        match self.step {
            FlowStep::AuthMethod => Ok(self.step_auth_method(input).await?),
            FlowStep::ApiKey => Ok(self.step_api_key(input)),
            FlowStep::JwtAuth => Ok(self.step_jwt_auth(input).await?),
            FlowStep::Location => Ok(self.step_location(input)),
            FlowStep::Disaster => Ok(self.step_disaster(input)),
        }
    }

    async fn step_auth_method(
        &mut self,
        input: Option<HashMap<String, String>>,
    ) -> Result<FlowResult, CertStoreError> {
        let Some(input) = input else {
            return Ok(self.auth_method_form(None));
        };
        if let Some(method) = input.get("auth_method") {
            self.auth_method = method.clone();
        }
        if self.auth_method == "key" {
            self.step = FlowStep::ApiKey;
            Ok(self.api_key_form(None))
        } else {
            self.step = FlowStep::JwtAuth;
            self.render_jwt_form().await
        }
    }

    fn step_api_key(&mut self, input: Option<HashMap<String, String>>) -> FlowResult {
        let Some(input) = input else {
            return self.api_key_form(None);
        };
        let key = input.get("key").cloned().unwrap_or_else(|| self.key.clone());
        let host = input
            .get("host")
            .cloned()
            .unwrap_or_else(|| self.host.clone());
        if key.is_empty() {
            return self.api_key_form(Some("key is empty"));
        }
        if host.is_empty() {
            return self.api_key_form(Some("host is empty"));
        }
        self.key = key;
        self.host = host;
        self.step = FlowStep::Location;
        self.location_form(None)
    }

    async fn step_jwt_auth(
        &mut self,
        input: Option<HashMap<String, String>>,
    ) -> Result<FlowResult, CertStoreError> {
        let Some(input) = input else {
            return self.render_jwt_form().await;
        };
        let sub = input
            .get("jwt_sub")
            .cloned()
            .unwrap_or_else(|| self.jwt_sub.clone());
        let kid = input
            .get("jwt_kid")
            .cloned()
            .unwrap_or_else(|| self.jwt_kid.clone());
        let host = input
            .get("host")
            .cloned()
            .unwrap_or_else(|| self.host.clone());
        if sub.is_empty() {
            return Ok(self.jwt_form(Some("jwt_sub is empty")));
        }
        if kid.is_empty() {
            return Ok(self.jwt_form(Some("jwt_kid is empty")));
        }
        if host.is_empty() {
            return Ok(self.jwt_form(Some("host is empty")));
        }
        self.jwt_sub = sub;
        self.jwt_kid = kid;
        self.host = host;
        self.step = FlowStep::Location;
        Ok(self.location_form(None))
    }

    fn step_location(&mut self, input: Option<HashMap<String, String>>) -> FlowResult {
        let Some(input) = input else {
            return self.location_form(None);
        };
        let longitude = input.get("longitude").cloned().unwrap_or_default();
        let latitude = input.get("latitude").cloned().unwrap_or_default();
        if longitude.is_empty() || latitude.is_empty() {
            return self.location_form(Some("empty_location"));
        }
        let Some(lon) = parse_longitude(&longitude) else {
            return self.location_form(Some("invalid_longitude"));
        };
        let Some(lat) = parse_latitude(&latitude) else {
            return self.location_form(Some("invalid_latitude"));
        };
        self.longitude = format!("{lon:.2}");
        self.latitude = format!("{lat:.2}");
        self.step = FlowStep::Disaster;
        self.disaster_form(None)
    }

    fn step_disaster(&mut self, input: Option<HashMap<String, String>>) -> FlowResult {
        let Some(input) = input else {
            return self.disaster_form(None);
        };
        if let Some(level) = input.get("disasterlevel") {
            self.disaster_level = level.clone();
        }
        if let Some(mode) = input.get("disastermsg") {
            self.disaster_msg = mode.clone();
        }
        self.create_entry()
    }

    fn create_entry(&self) -> FlowResult {
        info!(flow_id = %self.flow_id, "config flow complete");
        FlowResult::CreateEntry {
            title: DEFAULT_NAME.to_string(),
            data: EntryData {
                auth_method: self.auth_method.clone(),
                key: self.key.clone(),
                storage_path: self.storage_root.to_string_lossy().into_owned(),
                jwt_sub: self.jwt_sub.clone(),
                jwt_kid: self.jwt_kid.clone(),
                host: self.host.clone(),
                longitude: self.longitude.clone(),
                latitude: self.latitude.clone(),
                disaster_level: self.disaster_level.clone(),
                disaster_msg: self.disaster_msg.clone(),
            },
        }
    }

    /// First render of the token form: make sure a key pair exists and
    /// surface the public half for the user to register with the vendor.
    async fn render_jwt_form(&mut self) -> Result<FlowResult, CertStoreError> {
        let store = match &self.store {
            Some(store) => Arc::clone(store),
            None => {
                let store = ensure_store(&self.storage_root).await?;
                self.store = Some(Arc::clone(&store));
                store
            }
        };
        store.generate_keys().await;
        self.jwt_pubkey = store.public_key_pem().await.unwrap_or_default();
        Ok(self.jwt_form(None))
    }

    fn auth_method_form(&self, error: Option<&'static str>) -> FlowResult {
        FlowResult::Form(FlowForm {
            step: FlowStep::AuthMethod,
            fields: vec![FormField {
                name: "auth_method",
                default: self.auth_method.clone(),
            }],
            error,
            placeholders: HashMap::new(),
            last_step: false,
        })
    }

    fn api_key_form(&self, error: Option<&'static str>) -> FlowResult {
        FlowResult::Form(FlowForm {
            step: FlowStep::ApiKey,
            fields: vec![
                FormField {
                    name: "key",
                    default: self.key.clone(),
                },
                FormField {
                    name: "host",
                    default: self.host.clone(),
                },
            ],
            error,
            placeholders: HashMap::new(),
            last_step: false,
        })
    }

    fn jwt_form(&self, error: Option<&'static str>) -> FlowResult {
        let mut placeholders = HashMap::new();
        placeholders.insert("jwt_pubkey", self.jwt_pubkey.clone());
        FlowResult::Form(FlowForm {
            step: FlowStep::JwtAuth,
            fields: vec![
                FormField {
                    name: "jwt_sub",
                    default: self.jwt_sub.clone(),
                },
                FormField {
                    name: "jwt_kid",
                    default: self.jwt_kid.clone(),
                },
                FormField {
                    name: "host",
                    default: self.host.clone(),
                },
            ],
            error,
            placeholders,
            last_step: false,
        })
    }

    fn location_form(&self, error: Option<&'static str>) -> FlowResult {
        FlowResult::Form(FlowForm {
            step: FlowStep::Location,
            fields: vec![
                FormField {
                    name: "longitude",
                    default: self.longitude.clone(),
                },
                FormField {
                    name: "latitude",
                    default: self.latitude.clone(),
                },
            ],
            error,
            placeholders: HashMap::new(),
            last_step: false,
        })
    }

    fn disaster_form(&self, error: Option<&'static str>) -> FlowResult {
        FlowResult::Form(FlowForm {
            step: FlowStep::Disaster,
            fields: vec![
                FormField {
                    name: "disasterlevel",
                    default: self.disaster_level.clone(),
                },
                FormField {
                    name: "disastermsg",
                    default: self.disaster_msg.clone(),
                },
            ],
            error,
            placeholders: HashMap::new(),
            last_step: true,
        })
    }
}
