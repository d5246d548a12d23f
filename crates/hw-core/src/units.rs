//! Measurement unit strings exposed on entities.

pub const TEMP_CELSIUS: &str = "°C";
pub const PERCENTAGE: &str = "%";
pub const PRESSURE_HPA: &str = "hPa";
pub const SPEED_KILOMETERS_PER_HOUR: &str = "km/h";
pub const LENGTH_KILOMETERS: &str = "km";
pub const PRECIPITATION_MILLIMETERS_PER_HOUR: &str = "mm/h";
pub const CONCENTRATION_MICROGRAMS_PER_CUBIC_METER: &str = "µg/m³";
/// Unit-less sensors keep a single-space unit for display parity.
pub const NO_UNIT: &str = " ";
