//! Stage-2 output: damage scenarios and their impact ratings.

use serde::{Deserialize, Serialize};

/// Severity of a damage scenario along one impact dimension.
///
/// Ordering follows the numeric ranks used by the risk matrix
/// (Negligible = 0 .. Severe = 3).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum SeverityLevel {
    #[default]
    #[serde(alias = "negligible", alias = "NEGLIGIBLE")]
    Negligible,
    #[serde(alias = "moderate", alias = "MODERATE")]
    Moderate,
    #[serde(alias = "major", alias = "MAJOR")]
    Major,
    #[serde(alias = "severe", alias = "SEVERE")]
    Severe,
}

impl SeverityLevel {
    /// Rank used as the impact-axis index of the risk matrix.
    pub fn rank(self) -> usize {
        match self {
            SeverityLevel::Negligible => 0,
            SeverityLevel::Moderate => 1,
            SeverityLevel::Major => 2,
            SeverityLevel::Severe => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeverityLevel::Negligible => "Negligible",
            SeverityLevel::Moderate => "Moderate",
            SeverityLevel::Major => "Major",
            SeverityLevel::Severe => "Severe",
        }
    }
}

/// Result of the damage-scenario stage: one scenario with its per-dimension
/// severities. The overall impact level is derived, not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageScenarioImpactLevel {
    pub damage_scenario: String,
    pub safety: SeverityLevel,
    pub financial: SeverityLevel,
    pub operational: SeverityLevel,
    pub privacy: SeverityLevel,
}

impl DamageScenarioImpactLevel {
    /// Overall impact is the worst of the four dimensions.
    pub fn impact_level(&self) -> SeverityLevel {
        self.safety
            .max(self.financial)
            .max(self.operational)
            .max(self.privacy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_level_takes_maximum() {
        let scenario = DamageScenarioImpactLevel {
            damage_scenario: "Gateway firmware is replaced by an attacker".to_string(),
            safety: SeverityLevel::Moderate,
            financial: SeverityLevel::Severe,
            operational: SeverityLevel::Major,
            privacy: SeverityLevel::Negligible,
        };
        assert_eq!(scenario.impact_level(), SeverityLevel::Severe);
    }

    #[test]
    fn test_severity_parses_mixed_case() {
        let parsed: SeverityLevel = serde_json::from_str("\"negligible\"").unwrap();
        assert_eq!(parsed, SeverityLevel::Negligible);
        let parsed: SeverityLevel = serde_json::from_str("\"Severe\"").unwrap();
        assert_eq!(parsed, SeverityLevel::Severe);
    }
}
