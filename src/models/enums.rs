use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected string or payload for a closed enum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid enum value for {field}: {value}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AdherenceTrend {
    Improving => "improving",
    Stable => "stable",
    Declining => "declining",
    InsufficientData => "insufficient_data",
});

str_enum!(ResolutionSource {
    Mapped => "mapped",
    Fallback => "fallback",
});

// ---------------------------------------------------------------------------
// Frequency
// ---------------------------------------------------------------------------

/// Declared dosing frequency of a medication.
///
/// Serialised as `"daily"`, `"twice_daily"`, ... or `{"custom": 56}`.
/// `Custom(0)` is rejected when deserialising or parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "FrequencyRepr")]
pub enum Frequency {
    Daily,
    TwiceDaily,
    Weekly,
    BiWeekly,
    Monthly,
    AsNeeded,
    /// Every `n` days.
    Custom(u32),
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum FrequencyRepr {
    Daily,
    TwiceDaily,
    Weekly,
    BiWeekly,
    Monthly,
    AsNeeded,
    Custom(u32),
}

impl TryFrom<FrequencyRepr> for Frequency {
    type Error = InvalidEnum;

    fn try_from(repr: FrequencyRepr) -> Result<Self, Self::Error> {
        Ok(match repr {
            FrequencyRepr::Daily => Self::Daily,
            FrequencyRepr::TwiceDaily => Self::TwiceDaily,
            FrequencyRepr::Weekly => Self::Weekly,
            FrequencyRepr::BiWeekly => Self::BiWeekly,
            FrequencyRepr::Monthly => Self::Monthly,
            FrequencyRepr::AsNeeded => Self::AsNeeded,
            FrequencyRepr::Custom(days) => Self::custom(days)?,
        })
    }
}

impl Frequency {
    /// Every `interval_days` days. Zero is not a schedule.
    pub fn custom(interval_days: u32) -> Result<Self, InvalidEnum> {
        if interval_days == 0 {
            return Err(InvalidEnum {
                field: "Frequency".into(),
                value: "every_0_days".into(),
            });
        }
        Ok(Self::Custom(interval_days))
    }

    /// Canonical time between two doses. `None` for `AsNeeded`.
    pub fn expected_interval(&self) -> Option<Duration> {
        match self {
            Self::Daily => Some(Duration::hours(24)),
            Self::TwiceDaily => Some(Duration::hours(12)),
            Self::Weekly => Some(Duration::days(7)),
            Self::BiWeekly => Some(Duration::days(14)),
            Self::Monthly => Some(Duration::days(30)),
            Self::AsNeeded => None,
            Self::Custom(days) => Some(Duration::days(i64::from(*days))),
        }
    }

    /// Whole-day divisor for interval frequencies (weekly and longer).
    /// `None` for sub-daily/daily schedules and `AsNeeded`.
    pub fn interval_days(&self) -> Option<u32> {
        match self {
            Self::Daily | Self::TwiceDaily | Self::AsNeeded => None,
            Self::Weekly => Some(7),
            Self::BiWeekly => Some(14),
            Self::Monthly => Some(30),
            Self::Custom(days) => Some(*days),
        }
    }

    pub fn as_label(&self) -> String {
        match self {
            Self::Daily => "daily".into(),
            Self::TwiceDaily => "twice_daily".into(),
            Self::Weekly => "weekly".into(),
            Self::BiWeekly => "bi_weekly".into(),
            Self::Monthly => "monthly".into(),
            Self::AsNeeded => "as_needed".into(),
            Self::Custom(days) => format!("every_{days}_days"),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_label())
    }
}

impl std::str::FromStr for Frequency {
    type Err = InvalidEnum;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidEnum {
            field: "Frequency".into(),
            value: s.into(),
        };
        match s {
            "daily" => Ok(Self::Daily),
            "twice_daily" => Ok(Self::TwiceDaily),
            "weekly" => Ok(Self::Weekly),
            "bi_weekly" => Ok(Self::BiWeekly),
            "monthly" => Ok(Self::Monthly),
            "as_needed" => Ok(Self::AsNeeded),
            other => {
                let days = other
                    .strip_prefix("every_")
                    .and_then(|rest| rest.strip_suffix("_days"))
                    .and_then(|n| n.parse::<u32>().ok())
                    .ok_or_else(invalid)?;
                Self::custom(days).map_err(|_| invalid())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn trend_round_trips_through_str() {
        for trend in [
            AdherenceTrend::Improving,
            AdherenceTrend::Stable,
            AdherenceTrend::Declining,
            AdherenceTrend::InsufficientData,
        ] {
            assert_eq!(AdherenceTrend::from_str(trend.as_str()).unwrap(), trend);
        }
    }

    #[test]
    fn unknown_trend_is_rejected() {
        let err = AdherenceTrend::from_str("sideways").unwrap_err();
        assert_eq!(err.field, "AdherenceTrend");
        assert_eq!(err.value, "sideways");
    }

    #[test]
    fn frequency_intervals() {
        assert_eq!(Frequency::Daily.expected_interval(), Some(Duration::hours(24)));
        assert_eq!(Frequency::TwiceDaily.expected_interval(), Some(Duration::hours(12)));
        assert_eq!(Frequency::Weekly.expected_interval(), Some(Duration::days(7)));
        assert_eq!(Frequency::BiWeekly.expected_interval(), Some(Duration::days(14)));
        assert_eq!(Frequency::Monthly.expected_interval(), Some(Duration::days(30)));
        assert_eq!(Frequency::Custom(56).expected_interval(), Some(Duration::days(56)));
        assert_eq!(Frequency::AsNeeded.expected_interval(), None);
    }

    #[test]
    fn frequency_labels_parse_back() {
        for freq in [
            Frequency::Daily,
            Frequency::TwiceDaily,
            Frequency::Weekly,
            Frequency::BiWeekly,
            Frequency::Monthly,
            Frequency::AsNeeded,
            Frequency::Custom(56),
        ] {
            assert_eq!(Frequency::from_str(&freq.as_label()).unwrap(), freq);
        }
    }

    #[test]
    fn zero_day_custom_is_rejected() {
        assert!(Frequency::custom(0).is_err());
        assert!(Frequency::from_str("every_0_days").is_err());
        assert!(serde_json::from_str::<Frequency>(r#"{"custom": 0}"#).is_err());
    }

    #[test]
    fn malformed_frequency_label_is_rejected() {
        assert!(Frequency::from_str("every_two_days").is_err());
        assert!(Frequency::from_str("Daily").is_err());
        assert!(Frequency::from_str("").is_err());
    }

    #[test]
    fn frequency_json_shapes() {
        assert_eq!(
            serde_json::from_str::<Frequency>(r#""bi_weekly""#).unwrap(),
            Frequency::BiWeekly
        );
        assert_eq!(
            serde_json::from_str::<Frequency>(r#"{"custom": 56}"#).unwrap(),
            Frequency::Custom(56)
        );
        assert_eq!(
            serde_json::to_string(&Frequency::TwiceDaily).unwrap(),
            r#""twice_daily""#
        );
        assert_eq!(
            serde_json::to_string(&Frequency::Custom(3)).unwrap(),
            r#"{"custom":3}"#
        );
    }
}
