//! Stage-4 output: risk value and risk treatment decision.

use serde::{Deserialize, Serialize};

use crate::feasibility::AttackFeasibilityRating;
use crate::impact::SeverityLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTreatmentOption {
    #[serde(alias = "Avoid")]
    Avoid,
    #[serde(alias = "Reduce")]
    Reduce,
    #[serde(alias = "Share")]
    Share,
    #[serde(alias = "Retain")]
    Retain,
}

impl RiskTreatmentOption {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskTreatmentOption::Avoid => "Avoid",
            RiskTreatmentOption::Reduce => "Reduce",
            RiskTreatmentOption::Share => "Share",
            RiskTreatmentOption::Retain => "Retain",
        }
    }
}

/// Risk matrix: attack-feasibility row crossed with the impact-level column.
/// Values are 1 (lowest) to 5 (highest).
pub fn risk_value(impact: SeverityLevel, feasibility: AttackFeasibilityRating) -> u8 {
    const MATRIX: [[u8; 4]; 4] = [
        [1, 1, 1, 2], // verylow
        [1, 2, 2, 3], // low
        [1, 2, 3, 4], // medium
        [1, 3, 4, 5], // high
    ];
    let row = match feasibility {
        AttackFeasibilityRating::VeryLow => 0,
        AttackFeasibilityRating::Low => 1,
        AttackFeasibilityRating::Medium => 2,
        AttackFeasibilityRating::High => 3,
    };
    MATRIX[row][impact.rank()]
}

/// Result of the risk-treatment stage. The `risk_value` is computed from the
/// prior stages' ratings, not requested from the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskTreatmentDecision {
    pub risk_treatment: RiskTreatmentOption,
    pub item_change: String,
    pub cybersecurity_goal: String,
    pub cybersecurity_claim: String,
    #[serde(default)]
    pub risk_value: u8,
}
