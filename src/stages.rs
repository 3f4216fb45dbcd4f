//! Stage execution: one completion call per (unit, stage), schema-checked.

use std::sync::Arc;

use thiserror::Error;

use taraflow_client::{CompletionError, CompletionRequest, CompletionService};
use taraflow_core::{
    ControlRequirement, DamageScenarioImpactLevel, PropertyAssessment, RiskTreatmentDecision,
    StageKind, StageOutput, StageResults, ThreatScenarioAttackFeasibility, risk_value,
};

use crate::orchestrator::PropertyUnit;
use crate::prompts::{self, StagePrompt};

/// A stage call that did not produce a usable result.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {error}")]
pub struct StageFailure {
    pub stage: StageKind,
    #[source]
    pub error: CompletionError,
}

/// Generation parameters shared across stages, taken from the run config.
#[derive(Debug, Clone)]
pub struct StageLimits {
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub long_output_tokens: u32,
}

impl StageLimits {
    /// Output budget for one stage. The stages producing long structured
    /// output get the larger allowance.
    pub fn output_budget(&self, stage: StageKind) -> u32 {
        match stage {
            StageKind::ThreatScenario | StageKind::ControlRequirement => self.long_output_tokens,
            _ => self.max_output_tokens,
        }
    }
}

/// Executes single stages against the completion service. Builds each
/// request strictly from the unit's asset attributes and its own prior
/// stage results, and validates the stage-specific response schema.
pub struct StageExecutor {
    service: Arc<dyn CompletionService>,
    limits: StageLimits,
}

impl StageExecutor {
    pub fn new(service: Arc<dyn CompletionService>, limits: StageLimits) -> Self {
        Self { service, limits }
    }

    pub async fn run_stage(
        &self,
        unit: &PropertyUnit,
        stage: StageKind,
        prior: &StageResults,
    ) -> Result<StageOutput, StageFailure> {
        // risk_value is derived from prior ratings before the call so the
        // model sees it but never decides it.
        let mut computed_risk = None;

        let prompt = self.build_prompt(unit, stage, prior, &mut computed_risk)?;

        let request = CompletionRequest {
            system: prompts::SYSTEM_PROMPT.to_string(),
            content: prompt.content,
            instruction: prompt.instruction,
            temperature: self.limits.temperature,
            max_output_tokens: self.limits.output_budget(stage),
            schema: prompt.schema,
        };

        let payload = self
            .service
            .complete(request)
            .await
            .map_err(|error| StageFailure { stage, error })?;

        self.parse_output(stage, payload, computed_risk)
    }

    fn build_prompt(
        &self,
        unit: &PropertyUnit,
        stage: StageKind,
        prior: &StageResults,
        computed_risk: &mut Option<u8>,
    ) -> Result<StagePrompt, StageFailure> {
        let asset = unit.asset.as_ref();
        let property = unit.property;

        let prompt = match stage {
            StageKind::AttributeAnalysis => prompts::attribute_analysis(asset, property),
            StageKind::DamageScenario => {
                let attribute = require(stage, StageKind::AttributeAnalysis, &prior.attribute)?;
                prompts::damage_scenario(asset, property, attribute)
            }
            StageKind::ThreatScenario => {
                let damage = require(stage, StageKind::DamageScenario, &prior.damage)?;
                prompts::threat_scenario(asset, property, damage)
            }
            StageKind::RiskTreatment => {
                let damage = require(stage, StageKind::DamageScenario, &prior.damage)?;
                let threat = require(stage, StageKind::ThreatScenario, &prior.threat)?;
                let risk = risk_value(damage.impact_level(), threat.feasibility_rating());
                *computed_risk = Some(risk);
                prompts::risk_treatment(asset, property, damage, threat, risk)
            }
            StageKind::ControlRequirement => {
                let threat = require(stage, StageKind::ThreatScenario, &prior.threat)?;
                let treatment = require(stage, StageKind::RiskTreatment, &prior.treatment)?;
                prompts::control_requirement(asset, property, threat, treatment)
            }
        };
        Ok(prompt)
    }

    fn parse_output(
        &self,
        stage: StageKind,
        payload: serde_json::Value,
        computed_risk: Option<u8>,
    ) -> Result<StageOutput, StageFailure> {
        let schema_failure = |err: String| StageFailure {
            stage,
            error: CompletionError::SchemaValidation(err),
        };

        match stage {
            StageKind::AttributeAnalysis => {
                let assessment: PropertyAssessment = serde_json::from_value(payload)
                    .map_err(|e| schema_failure(e.to_string()))?;
                assessment
                    .validate()
                    .map_err(|e| schema_failure(e.to_string()))?;
                Ok(StageOutput::Attribute(assessment))
            }
            StageKind::DamageScenario => {
                let damage: DamageScenarioImpactLevel = serde_json::from_value(payload)
                    .map_err(|e| schema_failure(e.to_string()))?;
                Ok(StageOutput::Damage(damage))
            }
            StageKind::ThreatScenario => {
                let threat: ThreatScenarioAttackFeasibility = serde_json::from_value(payload)
                    .map_err(|e| schema_failure(e.to_string()))?;
                Ok(StageOutput::Threat(threat))
            }
            StageKind::RiskTreatment => {
                let mut treatment: RiskTreatmentDecision = serde_json::from_value(payload)
                    .map_err(|e| schema_failure(e.to_string()))?;
                if let Some(risk) = computed_risk {
                    treatment.risk_value = risk;
                }
                Ok(StageOutput::Treatment(treatment))
            }
            StageKind::ControlRequirement => {
                let control: ControlRequirement = serde_json::from_value(payload)
                    .map_err(|e| schema_failure(e.to_string()))?;
                Ok(StageOutput::Control(control))
            }
        }
    }
}

fn require<'a, T>(
    stage: StageKind,
    prerequisite: StageKind,
    slot: &'a Option<T>,
) -> Result<&'a T, StageFailure> {
    slot.as_ref().ok_or_else(|| StageFailure {
        stage,
        error: CompletionError::InvalidRequest(format!(
            "{stage} requires the {prerequisite} result, which is absent"
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    use taraflow_core::{Asset, AssetKind, SecurityProperty};

    struct StaticService(serde_json::Value);

    #[async_trait]
    impl CompletionService for StaticService {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<serde_json::Value, CompletionError> {
            Ok(self.0.clone())
        }
    }

    fn unit() -> PropertyUnit {
        PropertyUnit {
            asset: Arc::new(Asset {
                asset_id: "A-001".to_string(),
                asset_name: "ECU-Gateway".to_string(),
                kind: AssetKind::Hardware,
                communication_protocol: Some("CAN".to_string()),
                remarks: String::new(),
                properties: Vec::new(),
            }),
            property: SecurityProperty::Integrity,
        }
    }

    fn limits() -> StageLimits {
        StageLimits {
            temperature: 0.3,
            max_output_tokens: 8000,
            long_output_tokens: 12_000,
        }
    }

    #[test]
    fn test_long_output_stages_get_larger_budget() {
        let limits = limits();
        assert_eq!(limits.output_budget(StageKind::AttributeAnalysis), 8000);
        assert_eq!(limits.output_budget(StageKind::ThreatScenario), 12_000);
        assert_eq!(limits.output_budget(StageKind::ControlRequirement), 12_000);
    }

    #[tokio::test]
    async fn test_stage_with_missing_prerequisite_is_rejected() {
        let executor = StageExecutor::new(
            Arc::new(StaticService(json!({"damage_scenario": "x"}))),
            limits(),
        );
        let err = executor
            .run_stage(&unit(), StageKind::DamageScenario, &StageResults::default())
            .await
            .unwrap_err();
        assert_eq!(err.stage, StageKind::DamageScenario);
        assert!(matches!(err.error, CompletionError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_a_schema_failure() {
        let executor = StageExecutor::new(
            Arc::new(StaticService(
                json!({"relevance_score": 11, "rationale": "too eager"}),
            )),
            limits(),
        );
        let err = executor
            .run_stage(
                &unit(),
                StageKind::AttributeAnalysis,
                &StageResults::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err.error, CompletionError::SchemaValidation(_)));
    }

    #[tokio::test]
    async fn test_well_formed_attribute_payload_parses() {
        let executor = StageExecutor::new(
            Arc::new(StaticService(
                json!({"relevance_score": 4, "rationale": "routable interface"}),
            )),
            limits(),
        );
        let output = executor
            .run_stage(
                &unit(),
                StageKind::AttributeAnalysis,
                &StageResults::default(),
            )
            .await
            .unwrap();
        match output {
            StageOutput::Attribute(a) => assert_eq!(a.relevance_score, 4),
            other => panic!("unexpected output: {other:?}"),
        }
    }
}
