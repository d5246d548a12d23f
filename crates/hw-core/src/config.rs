//! Configuration keys, defaults and choice tables
//!
//! Key names match what the config flow persists into the entry data, so
//! they never change without a config entry migration.

/// Integration domain.
pub const DOMAIN: &str = "heweather";
/// Default entry title.
pub const DEFAULT_NAME: &str = "和风天气";

pub const CONF_AUTH_METHOD: &str = "auth_method";
pub const CONF_LONGITUDE: &str = "longitude";
pub const CONF_LATITUDE: &str = "latitude";
pub const CONF_HOST: &str = "host";
pub const CONF_KEY: &str = "key";
pub const CONF_STORAGE_PATH: &str = "storage_path";
pub const CONF_JWT_SUB: &str = "auth_jwt_sub";
pub const CONF_JWT_KID: &str = "auth_jwt_kid";
pub const CONF_DISASTER_LEVEL: &str = "disasterlevel";
pub const CONF_DISASTER_MSG: &str = "disastermsg";

pub const DEFAULT_HOST: &str = "devapi.qweather.com";
pub const DEFAULT_AUTH_METHOD: &str = "key";
pub const DEFAULT_DISASTER_LEVEL: &str = "3";
pub const DEFAULT_DISASTER_MSG: &str = "allmsg";

/// Authentication method choices offered by the config flow.
pub const AUTH_METHOD_CHOICES: &[(&str, &str)] =
    &[("key", "API KEY"), ("jwt", "JSON Web Token (Alpha)")];

/// Minimum disaster severity choices (rank on the 0-6 scale).
pub const DISASTER_LEVEL_CHOICES: &[(&str, &str)] = &[
    ("1", "标准的"),
    ("2", "次要的"),
    ("3", "中等的"),
    ("4", "主要"),
    ("5", "严重"),
    ("6", "极端"),
];

/// Disaster message verbosity choices.
pub const DISASTER_MSG_CHOICES: &[(&str, &str)] = &[("title", "仅标题"), ("allmsg", "所有信息")];

/// Attribution shown on every entity.
pub const ATTRIBUTION: &str = "来自和风天气的天气数据";
