//! Scoring results.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Probabilities strictly above this value are predicted no-shows.
pub const NO_SHOW_THRESHOLD: f64 = 0.5;

/// Binary prediction derived from a probability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NoShowLabel {
    /// Predicted to miss the appointment
    #[serde(rename = "Y")]
    Yes,
    /// Predicted to attend
    #[serde(rename = "N")]
    No,
}

impl NoShowLabel {
    /// Label for a probability. Exactly 0.5 is `No`.
    pub fn from_probability(probability: f64) -> Self {
        if probability > NO_SHOW_THRESHOLD {
            NoShowLabel::Yes
        } else {
            NoShowLabel::No
        }
    }

    /// Display code (`Y` / `N`).
    pub fn code(&self) -> &'static str {
        match self {
            NoShowLabel::Yes => "Y",
            NoShowLabel::No => "N",
        }
    }
}

impl std::fmt::Display for NoShowLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// One filtered appointment with its prediction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredAppointment {
    pub mrn: String,
    pub appt_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub label: NoShowLabel,
    pub probability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(NoShowLabel::from_probability(0.5), NoShowLabel::No);
        assert_eq!(NoShowLabel::from_probability(0.500_000_1), NoShowLabel::Yes);
        assert_eq!(NoShowLabel::from_probability(0.0), NoShowLabel::No);
        assert_eq!(NoShowLabel::from_probability(1.0), NoShowLabel::Yes);
    }

    #[test]
    fn test_label_serializes_as_code() {
        assert_eq!(serde_json::to_string(&NoShowLabel::Yes).unwrap(), "\"Y\"");
        assert_eq!(NoShowLabel::No.to_string(), "N");
    }
}
