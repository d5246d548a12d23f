//! Disaster warning severity scale
//!
//! The vendor reports warning severity either by name ("Moderate") or by
//! colour ("orange"). Both collapse onto a 0-6 rank that user preferences
//! are compared against.

use serde::{Deserialize, Serialize};

/// How much of a qualifying warning is surfaced on the warning sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageMode {
    /// Warning titles only.
    Title,
    /// Title plus full warning text.
    #[default]
    #[serde(rename = "allmsg")]
    Full,
}

impl MessageMode {
    /// Parse the persisted config value; anything unrecognized falls back
    /// to the full-message default.
    pub fn from_config(value: &str) -> Self {
        match value {
            "title" => MessageMode::Title,
            _ => MessageMode::Full,
        }
    }
}

/// Rank a vendor severity string on the 0-6 scale. Unknown severities rank
/// lowest so they never trip a user threshold.
pub fn severity_rank(severity: &str) -> u8 {
    match severity.to_ascii_lowercase().as_str() {
        "standard" | "blue" => 1,
        "minor" | "green" => 2,
        "moderate" | "yellow" => 3,
        "major" | "orange" => 4,
        "severe" | "red" => 5,
        "extreme" | "black" => 6,
        // cancel / none / unknown / white
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_and_colour_scales_agree() {
        assert_eq!(severity_rank("Moderate"), severity_rank("yellow"));
        assert_eq!(severity_rank("Extreme"), severity_rank("black"));
        assert_eq!(severity_rank("Cancel"), 0);
        assert_eq!(severity_rank("white"), 0);
        assert_eq!(severity_rank("somethingelse"), 0);
    }

    #[test]
    fn test_message_mode_from_config() {
        assert_eq!(MessageMode::from_config("title"), MessageMode::Title);
        assert_eq!(MessageMode::from_config("allmsg"), MessageMode::Full);
        assert_eq!(MessageMode::from_config(""), MessageMode::Full);
    }
}
