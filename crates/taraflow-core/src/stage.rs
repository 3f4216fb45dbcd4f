//! The ordered analysis stages and the per-unit result accumulator.

use serde::{Deserialize, Serialize};

use crate::attribute::PropertyAssessment;
use crate::control::ControlRequirement;
use crate::feasibility::ThreatScenarioAttackFeasibility;
use crate::impact::DamageScenarioImpactLevel;
use crate::treatment::RiskTreatmentDecision;

/// One step of the five-stage analysis chain, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageKind {
    AttributeAnalysis,
    DamageScenario,
    ThreatScenario,
    RiskTreatment,
    ControlRequirement,
}

impl StageKind {
    pub const ALL: [StageKind; 5] = [
        StageKind::AttributeAnalysis,
        StageKind::DamageScenario,
        StageKind::ThreatScenario,
        StageKind::RiskTreatment,
        StageKind::ControlRequirement,
    ];

    /// 1-based position in the chain.
    pub fn index(self) -> usize {
        match self {
            StageKind::AttributeAnalysis => 1,
            StageKind::DamageScenario => 2,
            StageKind::ThreatScenario => 3,
            StageKind::RiskTreatment => 4,
            StageKind::ControlRequirement => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StageKind::AttributeAnalysis => "attribute-analysis",
            StageKind::DamageScenario => "damage-scenario",
            StageKind::ThreatScenario => "threat-scenario",
            StageKind::RiskTreatment => "risk-treatment",
            StageKind::ControlRequirement => "control-requirement",
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A successfully parsed output of one stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    Attribute(PropertyAssessment),
    Damage(DamageScenarioImpactLevel),
    Threat(ThreatScenarioAttackFeasibility),
    Treatment(RiskTreatmentDecision),
    Control(ControlRequirement),
}

impl StageOutput {
    pub fn stage(&self) -> StageKind {
        match self {
            StageOutput::Attribute(_) => StageKind::AttributeAnalysis,
            StageOutput::Damage(_) => StageKind::DamageScenario,
            StageOutput::Threat(_) => StageKind::ThreatScenario,
            StageOutput::Treatment(_) => StageKind::RiskTreatment,
            StageOutput::Control(_) => StageKind::ControlRequirement,
        }
    }
}

/// Accumulated stage outputs for one property unit. A slot is filled exactly
/// once, when its stage succeeds; later stages read only earlier slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageResults {
    pub attribute: Option<PropertyAssessment>,
    pub damage: Option<DamageScenarioImpactLevel>,
    pub threat: Option<ThreatScenarioAttackFeasibility>,
    pub treatment: Option<RiskTreatmentDecision>,
    pub control: Option<ControlRequirement>,
}

impl StageResults {
    pub fn record(&mut self, output: StageOutput) {
        match output {
            StageOutput::Attribute(a) => self.attribute = Some(a),
            StageOutput::Damage(d) => self.damage = Some(d),
            StageOutput::Threat(t) => self.threat = Some(t),
            StageOutput::Treatment(t) => self.treatment = Some(t),
            StageOutput::Control(c) => self.control = Some(c),
        }
    }

    pub fn is_recorded(&self, stage: StageKind) -> bool {
        match stage {
            StageKind::AttributeAnalysis => self.attribute.is_some(),
            StageKind::DamageScenario => self.damage.is_some(),
            StageKind::ThreatScenario => self.threat.is_some(),
            StageKind::RiskTreatment => self.treatment.is_some(),
            StageKind::ControlRequirement => self.control.is_some(),
        }
    }

    pub fn is_complete(&self) -> bool {
        StageKind::ALL.iter().all(|s| self.is_recorded(*s))
    }
}

/// Terminal status of one property unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitStatus {
    Complete,
    PartiallyComplete,
    Failed,
}

impl UnitStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitStatus::Complete => "complete",
            UnitStatus::PartiallyComplete => "partially-complete",
            UnitStatus::Failed => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        let indices: Vec<usize> = StageKind::ALL.iter().map(|s| s.index()).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_record_fills_matching_slot() {
        let mut results = StageResults::default();
        assert!(!results.is_recorded(StageKind::AttributeAnalysis));
        results.record(StageOutput::Attribute(PropertyAssessment {
            relevance_score: 4,
            rationale: "remote attack surface".to_string(),
        }));
        assert!(results.is_recorded(StageKind::AttributeAnalysis));
        assert!(!results.is_complete());
    }
}
