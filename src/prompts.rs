//! Prompt construction for the five analysis stages.
//!
//! Every stage request carries a JSON context document under `content` built
//! from the unit's asset attributes and that unit's prior stage results
//! only, an instruction, and a schema hint with the required keys the
//! response must contain.

use serde_json::json;

use taraflow_client::SchemaHint;
use taraflow_core::{
    Asset, DamageScenarioImpactLevel, PropertyAssessment, RiskTreatmentDecision, SecurityProperty,
    ThreatScenarioAttackFeasibility,
};

pub const SYSTEM_PROMPT: &str = "You are an experienced ISO 21434 automotive cybersecurity \
    analyst performing a TARA (threat analysis and risk assessment) for vehicle E/E assets. \
    Answer with a single JSON object only: no markdown fences, no commentary, no explanations \
    outside the JSON.";

/// One fully built stage request, minus generation parameters.
#[derive(Debug, Clone)]
pub struct StagePrompt {
    pub content: String,
    pub instruction: String,
    pub schema: SchemaHint,
}

fn asset_context(asset: &Asset, property: SecurityProperty) -> serde_json::Value {
    json!({
        "asset": {
            "asset_id": asset.asset_id,
            "asset_name": asset.asset_name,
            "asset_type": asset.kind.as_str(),
            "communication_protocol": asset.communication_protocol,
            "remarks": asset.remarks,
        },
        "security_property": property.as_str(),
    })
}

pub fn attribute_analysis(asset: &Asset, property: SecurityProperty) -> StagePrompt {
    StagePrompt {
        content: asset_context(asset, property).to_string(),
        instruction: format!(
            "Given the asset above, rate how relevant the cybersecurity property \
             \"{}\" is for this asset on a 0-5 scale (0 = irrelevant, 5 = highly \
             relevant) and justify the rating in one or two sentences.",
            property.as_str()
        ),
        schema: SchemaHint::new(
            &["relevance_score", "rationale"],
            r#"{"relevance_score": 4, "rationale": "The gateway authenticates all inter-domain traffic."}"#,
        ),
    }
}

pub fn damage_scenario(
    asset: &Asset,
    property: SecurityProperty,
    attribute: &PropertyAssessment,
) -> StagePrompt {
    let mut context = asset_context(asset, property);
    context["attribute_assessment"] = json!({
        "relevance_score": attribute.relevance_score,
        "rationale": attribute.rationale,
    });
    StagePrompt {
        content: context.to_string(),
        instruction: "Describe the most significant damage scenario that follows from a \
             violation of this security property on this asset, and rate its impact on the \
             safety, financial, operational and privacy dimensions using one of: Negligible, \
             Moderate, Major, Severe."
            .to_string(),
        schema: SchemaHint::new(
            &["damage_scenario", "safety", "financial", "operational", "privacy"],
            r#"{"damage_scenario": "Unauthorized firmware replaces the gateway image", "safety": "Severe", "financial": "Major", "operational": "Major", "privacy": "Negligible"}"#,
        ),
    }
}

pub fn threat_scenario(
    asset: &Asset,
    property: SecurityProperty,
    damage: &DamageScenarioImpactLevel,
) -> StagePrompt {
    let mut context = asset_context(asset, property);
    context["damage_scenario_impact_level"] = json!({
        "damage_scenario": damage.damage_scenario,
        "safety": damage.safety.as_str(),
        "financial": damage.financial.as_str(),
        "operational": damage.operational.as_str(),
        "privacy": damage.privacy.as_str(),
        "impact_level": damage.impact_level().as_str(),
    });
    StagePrompt {
        content: context.to_string(),
        instruction: "Derive the threat scenario that realizes the damage scenario above, \
             spell out its most plausible attack path step by step, and rate the attack \
             potential. Use time_consuming in {no_more_than_1d, no_more_than_1w, \
             no_more_than_1m, no_more_than_6m, more_than_6m}, expertise in {layman, \
             proficient, expert, multiple expert}, knowledge_about_toe in {public, \
             restricted, confidential, strictly confidential}, window_of_opportunity in \
             {unlimited, easy, moderate, difficult}, equipment in {standard, specialized, \
             bespoke, multiple bespoke}."
            .to_string(),
        schema: SchemaHint::new(
            &[
                "threat_scenario",
                "attack_path",
                "time_consuming",
                "expertise",
                "knowledge_about_toe",
                "window_of_opportunity",
                "equipment",
            ],
            r#"{"threat_scenario": "An attacker injects forged CAN frames", "attack_path": "OBD access -> bus flooding -> spoofed frames", "time_consuming": "no_more_than_1w", "expertise": "proficient", "knowledge_about_toe": "restricted", "window_of_opportunity": "easy", "equipment": "specialized"}"#,
        ),
    }
}

pub fn risk_treatment(
    asset: &Asset,
    property: SecurityProperty,
    damage: &DamageScenarioImpactLevel,
    threat: &ThreatScenarioAttackFeasibility,
    risk_value: u8,
) -> StagePrompt {
    let mut context = asset_context(asset, property);
    context["damage_scenario"] = json!(damage.damage_scenario);
    context["impact_level"] = json!(damage.impact_level().as_str());
    context["threat_scenario"] = json!(threat.threat_scenario);
    context["attack_feasibility_rating"] = json!(threat.feasibility_rating().as_str());
    context["risk_value"] = json!(risk_value);
    StagePrompt {
        content: context.to_string(),
        instruction: "Decide the risk treatment for the risk above (one of: avoid, reduce, \
             share, retain), describe the item change it implies, and state the resulting \
             cybersecurity goal and cybersecurity claim."
            .to_string(),
        schema: SchemaHint::new(
            &["risk_treatment", "item_change", "cybersecurity_goal", "cybersecurity_claim"],
            r#"{"risk_treatment": "reduce", "item_change": "Add message authentication on the diagnostic interface", "cybersecurity_goal": "Only authenticated testers may open diagnostic sessions", "cybersecurity_claim": "Physical access to the vehicle interior is assumed restricted"}"#,
        ),
    }
}

pub fn control_requirement(
    asset: &Asset,
    property: SecurityProperty,
    threat: &ThreatScenarioAttackFeasibility,
    treatment: &RiskTreatmentDecision,
) -> StagePrompt {
    let mut context = asset_context(asset, property);
    context["threat_scenario"] = json!(threat.threat_scenario);
    context["attack_path"] = json!(threat.attack_path);
    context["risk_treatment"] = json!(treatment.risk_treatment.as_str());
    context["cybersecurity_goal"] = json!(treatment.cybersecurity_goal);
    StagePrompt {
        content: context.to_string(),
        instruction: "Derive the cybersecurity control implementing the treatment decision \
             above and the atomic cybersecurity requirement it imposes on the asset. State \
             whether the control is allocated to the device itself (yes/no)."
            .to_string(),
        schema: SchemaHint::new(
            &[
                "cybersecurity_control_id",
                "cybersecurity_control",
                "allocated_to_device",
                "cybersecurity_requirement_id",
                "cybersecurity_requirement",
            ],
            r#"{"cybersecurity_control_id": "CSO-001", "cybersecurity_control": "Mutual authentication for diagnostic sessions", "allocated_to_device": "yes", "cybersecurity_requirement_id": "CSR-001", "cybersecurity_requirement": "The gateway shall reject unauthenticated UDS requests"}"#,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taraflow_core::{AssetKind, SeverityLevel};

    fn asset() -> Asset {
        Asset {
            asset_id: "A-001".to_string(),
            asset_name: "ECU-Gateway".to_string(),
            kind: AssetKind::Hardware,
            communication_protocol: Some("CAN".to_string()),
            remarks: String::new(),
            properties: Vec::new(),
        }
    }

    #[test]
    fn test_attribute_prompt_carries_asset_and_property() {
        let prompt = attribute_analysis(&asset(), SecurityProperty::Integrity);
        let context: serde_json::Value = serde_json::from_str(&prompt.content).unwrap();
        assert_eq!(context["asset"]["asset_id"], "A-001");
        assert_eq!(context["security_property"], "Integrity");
        assert!(prompt.schema.required_keys.contains(&"relevance_score"));
    }

    #[test]
    fn test_threat_prompt_includes_only_prior_stage_results() {
        let damage = DamageScenarioImpactLevel {
            damage_scenario: "Gateway firmware replaced".to_string(),
            safety: SeverityLevel::Severe,
            financial: SeverityLevel::Major,
            operational: SeverityLevel::Moderate,
            privacy: SeverityLevel::Negligible,
        };
        let prompt = threat_scenario(&asset(), SecurityProperty::Integrity, &damage);
        let context: serde_json::Value = serde_json::from_str(&prompt.content).unwrap();
        assert_eq!(
            context["damage_scenario_impact_level"]["damage_scenario"],
            "Gateway firmware replaced"
        );
        assert_eq!(
            context["damage_scenario_impact_level"]["impact_level"],
            "Severe"
        );
        // No later-stage keys leak into the context.
        assert!(context.get("risk_treatment").is_none());
        assert!(context.get("cybersecurity_goal").is_none());
    }
}
