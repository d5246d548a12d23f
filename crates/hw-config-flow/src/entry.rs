//! Config entry data
//!
//! The flat key/value payload the wizard persists into the host's config
//! entry. Serde field names match the persisted keys in
//! [`hw_core::config`], so stored entries survive round-trips unchanged.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryData {
    pub auth_method: String,
    pub key: String,
    pub storage_path: String,
    #[serde(rename = "auth_jwt_sub")]
    pub jwt_sub: String,
    #[serde(rename = "auth_jwt_kid")]
    pub jwt_kid: String,
    pub host: String,
    pub longitude: String,
    pub latitude: String,
    #[serde(rename = "disasterlevel")]
    pub disaster_level: String,
    #[serde(rename = "disastermsg")]
    pub disaster_msg: String,
}

impl EntryData {
    /// `lon,lat` pair in the form the vendor's `location` parameter takes.
    pub fn location(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }

    pub fn uses_token_auth(&self) -> bool {
        self.auth_method == "jwt"
    }
}
