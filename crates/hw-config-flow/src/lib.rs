//! Setup wizard for the HeWeather integration
//!
//! A linear form sequence: authentication method, credentials (API key or
//! token identity), location, disaster-alert preferences. The token path
//! generates the Ed25519 key pair up front and shows the public key so the
//! user can register it with the vendor.

pub mod entry;
pub mod flow;

pub use entry::EntryData;
pub use flow::{ConfigFlow, FlowForm, FlowResult, FlowStep, FormField};
