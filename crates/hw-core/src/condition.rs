//! Platform weather conditions
//!
//! The vendor reports conditions as free-form Chinese text ("晴", "雷阵雨",
//! ...). Entities expose the platform's fixed condition keywords instead,
//! so every observation and forecast passes through [`Condition::from_vendor_text`].

use serde::{Deserialize, Serialize};

/// Platform condition keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    Sunny,
    Cloudy,
    #[serde(rename = "partlycloudy")]
    PartlyCloudy,
    Windy,
    WindyVariant,
    Hurricane,
    Rainy,
    Pouring,
    LightningRainy,
    Fog,
    Hail,
    Snowy,
    SnowyRainy,
    Exceptional,
}

/// Vendor condition text grouped by platform condition.
const CONDITION_CLASSES: &[(Condition, &[&str])] = &[
    (Condition::Sunny, &["晴"]),
    (Condition::Cloudy, &["多云"]),
    (Condition::PartlyCloudy, &["少云", "晴间多云", "阴"]),
    (Condition::Windy, &["有风", "微风", "和风", "清风"]),
    (Condition::WindyVariant, &["强风", "劲风", "疾风", "大风", "烈风"]),
    (
        Condition::Hurricane,
        &["飓风", "龙卷风", "热带风暴", "狂暴风", "风暴"],
    ),
    (
        Condition::Rainy,
        &[
            "雨",
            "毛毛雨",
            "细雨",
            "小雨",
            "小到中雨",
            "中雨",
            "中到大雨",
            "大雨",
            "大到暴雨",
            "阵雨",
            "极端降雨",
            "冻雨",
        ],
    ),
    (
        Condition::Pouring,
        &[
            "暴雨",
            "暴雨到大暴雨",
            "大暴雨",
            "大暴雨到特大暴雨",
            "特大暴雨",
            "强阵雨",
        ],
    ),
    (Condition::LightningRainy, &["雷阵雨", "强雷阵雨"]),
    (
        Condition::Fog,
        &[
            "雾",
            "薄雾",
            "霾",
            "浓雾",
            "强浓雾",
            "中度霾",
            "重度霾",
            "严重霾",
            "大雾",
            "特强浓雾",
        ],
    ),
    (Condition::Hail, &["雷阵雨伴有冰雹"]),
    (
        Condition::Snowy,
        &[
            "小雪",
            "小到中雪",
            "中雪",
            "中到大雪",
            "大雪",
            "大到暴雪",
            "暴雪",
            "阵雪",
        ],
    ),
    (Condition::SnowyRainy, &["雨夹雪", "雨雪天气", "阵雨夹雪"]),
    (
        Condition::Exceptional,
        &["扬沙", "浮尘", "沙尘暴", "强沙尘暴", "未知"],
    ),
];

impl Condition {
    /// Classify vendor condition text. Unknown text maps to no condition
    /// rather than a guess.
    pub fn from_vendor_text(text: &str) -> Option<Self> {
        CONDITION_CLASSES
            .iter()
            .find(|(_, texts)| texts.contains(&text))
            .map(|(condition, _)| *condition)
    }

    /// The platform keyword for this condition.
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Sunny => "sunny",
            Condition::Cloudy => "cloudy",
            Condition::PartlyCloudy => "partlycloudy",
            Condition::Windy => "windy",
            Condition::WindyVariant => "windy-variant",
            Condition::Hurricane => "hurricane",
            Condition::Rainy => "rainy",
            Condition::Pouring => "pouring",
            Condition::LightningRainy => "lightning-rainy",
            Condition::Fog => "fog",
            Condition::Hail => "hail",
            Condition::Snowy => "snowy",
            Condition::SnowyRainy => "snowy-rainy",
            Condition::Exceptional => "exceptional",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_vendor_text() {
        assert_eq!(Condition::from_vendor_text("晴"), Some(Condition::Sunny));
        assert_eq!(
            Condition::from_vendor_text("晴间多云"),
            Some(Condition::PartlyCloudy)
        );
        assert_eq!(
            Condition::from_vendor_text("雷阵雨"),
            Some(Condition::LightningRainy)
        );
        assert_eq!(
            Condition::from_vendor_text("特大暴雨"),
            Some(Condition::Pouring)
        );
        assert_eq!(Condition::from_vendor_text("not weather"), None);
    }

    #[test]
    fn test_keyword_matches_serde_form() {
        for condition in [
            Condition::Sunny,
            Condition::PartlyCloudy,
            Condition::WindyVariant,
            Condition::LightningRainy,
            Condition::SnowyRainy,
        ] {
            let json = serde_json::to_string(&condition).unwrap();
            assert_eq!(json, format!("\"{}\"", condition.as_str()));
        }
    }
}
