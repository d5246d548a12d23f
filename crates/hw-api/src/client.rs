//! Vendor API client
//!
//! One client per config entry. Requests authenticate either with the
//! static API key as a query parameter or with a freshly minted EdDSA
//! bearer token; tokens are never reused across requests.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use hw_cert::CertStore;

/// Total request timeout, matching the vendor's recommended budget.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// How a client authenticates against the vendor API.
#[derive(Clone)]
pub enum Credentials {
    /// Static key sent as the `key` query parameter.
    ApiKey(String),
    /// Per-request bearer token signed by the certificate store.
    Jwt {
        store: Arc<CertStore>,
        sub: String,
        kid: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ApiKey(_) => f.write_str("Credentials::ApiKey(..)"),
            Credentials::Jwt { sub, kid, .. } => f
                .debug_struct("Credentials::Jwt")
                .field("sub", sub)
                .field("kid", kid)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("vendor rejected the request, code={code}")]
    BadStatus { code: String },

    #[error("malformed vendor payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no signing key available, generate a key pair first")]
    MissingKey,
}

pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP client bound to one vendor host and one set of credentials.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    host: String,
    location: String,
    credentials: Credentials,
}

impl ApiClient {
    /// `location` is the vendor's `lon,lat` coordinate pair, fixed per
    /// config entry.
    pub fn new(
        host: impl Into<String>,
        location: impl Into<String>,
        credentials: Credentials,
    ) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            host: host.into(),
            location: location.into(),
            credentials,
        })
    }

    /// Fetch a v7 endpoint and deserialize its payload. The vendor wraps
    /// every response in an envelope whose `code` field must be `"200"`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        extra: &[(&str, &str)],
    ) -> ApiResult<T> {
        let url = format!("https://{}{}", self.host, path);
        debug!(%url, "fetching vendor endpoint");

        let mut request = self
            .http
            .get(&url)
            .query(&[("location", self.location.as_str())])
            .query(extra);

        match &self.credentials {
            Credentials::ApiKey(key) => {
                request = request.query(&[("key", key.as_str())]);
            }
            Credentials::Jwt { store, sub, kid } => {
                let token = store
                    .issue_weather_token(sub, kid, Utc::now().timestamp())
                    .await
                    .ok_or(ApiError::MissingKey)?;
                request = request.bearer_auth(token);
            }
        }

        let value: serde_json::Value = request.send().await?.error_for_status()?.json().await?;

        let code = value
            .get("code")
            .and_then(|code| code.as_str())
            .unwrap_or_default();
        if code != "200" {
            return Err(ApiError::BadStatus {
                code: code.to_string(),
            });
        }

        Ok(serde_json::from_value(value)?)
    }
}
