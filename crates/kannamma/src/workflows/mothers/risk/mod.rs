//! Additive point-score risk classification.
//!
//! Point values and label thresholds are fixed clinical constants, not
//! tunable configuration.

mod rules;

use serde::{Deserialize, Serialize};

use super::domain::MotherProfile;

/// Three-level summary of combined medical and communication risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    Green,
    Yellow,
    Red,
}

impl RiskLabel {
    pub const RED_THRESHOLD: u8 = 4;
    pub const YELLOW_THRESHOLD: u8 = 2;

    pub fn from_score(score: u8) -> Self {
        if score >= Self::RED_THRESHOLD {
            RiskLabel::Red
        } else if score >= Self::YELLOW_THRESHOLD {
            RiskLabel::Yellow
        } else {
            RiskLabel::Green
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLabel::Green => "Green",
            RiskLabel::Yellow => "Yellow",
            RiskLabel::Red => "Red",
        }
    }
}

/// Scoring rule that contributed to an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    ChronicCondition,
    MaternalAge,
    Parity,
    PriorComplications,
    Weight,
    MissedCalls,
}

/// Discrete contribution to an assessment, kept for audit trails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: RiskFactor,
    pub points: u8,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub label: RiskLabel,
    pub total_score: u8,
    pub components: Vec<ScoreComponent>,
}

/// Score a profile and keep every non-zero contribution.
pub fn assess(profile: &MotherProfile, consecutive_missed_calls: u32) -> RiskAssessment {
    let components = rules::score_profile(profile, consecutive_missed_calls);
    let total_score = components.iter().map(|component| component.points).sum();

    RiskAssessment {
        label: RiskLabel::from_score(total_score),
        total_score,
        components,
    }
}

pub fn classify(profile: &MotherProfile, consecutive_missed_calls: u32) -> RiskLabel {
    RiskLabel::from_score(rules::total_score(profile, consecutive_missed_calls))
}
