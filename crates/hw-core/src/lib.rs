//! Shared domain types for the HeWeather integration
//!
//! This crate holds the pure, dependency-free building blocks the rest of
//! the integration is written against:
//!
//! - [`Condition`] - platform weather condition keywords and the mapping
//!   from the vendor's Chinese condition text
//! - [`disaster`] - the disaster-warning severity scale and message modes
//! - [`config`] - configuration keys, defaults and choice tables
//! - [`units`] - measurement unit strings exposed on entities

pub mod condition;
pub mod config;
pub mod disaster;
pub mod units;

pub use condition::Condition;
pub use disaster::{severity_rank, MessageMode};
