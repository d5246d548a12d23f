//! Key material store for the HeWeather integration
//!
//! Vendor token authentication signs short-lived EdDSA tokens with an
//! Ed25519 key pair that lives on disk next to the integration's storage.
//! This crate owns that key pair:
//!
//! - [`CertStore`] - generates, persists, loads and deletes the PEM-encoded
//!   key pair, serializing concurrent file access per path
//! - [`TokenClaims`] - the fixed claim shape presented to the vendor API
//! - [`ensure_store`] - idempotent per-root accessor used by the config
//!   flow and the polling clients
//!
//! # Storage
//!
//! Both PEM halves live under `<root>/certs/` with fixed file names. The
//! store guarantees at most one filesystem operation per path is in flight
//! at a time; it does not write via atomic rename.

pub mod registry;
pub mod store;
pub mod token;

pub use registry::ensure_store;
pub use store::{CertStore, CertStoreError, CERT_NAME_PREFIX};
pub use token::{TokenClaims, TOKEN_BACKDATE_SECS, TOKEN_LIFETIME_SECS};
