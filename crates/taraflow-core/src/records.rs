//! Aggregate record families handed to the output sink.
//!
//! One `AssetTaraInfo` and one `AssetCsrInfo` exist per asset regardless of
//! how many of its units failed; absent stage data is rendered with
//! [`MISSING_FIELD`] so consumers can tell "analyzed" from "not analyzed".

use serde::{Deserialize, Serialize};

use crate::asset::SecurityProperty;
use crate::attribute::PropertyAssessment;
use crate::control::ControlRequirement;
use crate::feasibility::ThreatScenarioAttackFeasibility;
use crate::impact::DamageScenarioImpactLevel;
use crate::stage::UnitStatus;
use crate::treatment::RiskTreatmentDecision;

/// Marker written into any output field whose stage never completed.
pub const MISSING_FIELD: &str = "NOT_ANALYZED";

/// The stage 1-4 outputs of a single property unit, as merged into the
/// asset's TARA record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaraEntry {
    pub property: SecurityProperty,
    pub status: UnitStatus,
    pub attribute: Option<PropertyAssessment>,
    pub damage: Option<DamageScenarioImpactLevel>,
    pub threat: Option<ThreatScenarioAttackFeasibility>,
    pub treatment: Option<RiskTreatmentDecision>,
}

/// Full TARA record for one asset: one entry per property unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetTaraInfo {
    pub asset_id: String,
    pub asset_name: String,
    pub entries: Vec<TaraEntry>,
}

/// The stage-5 output of a single property unit, as merged into the asset's
/// control-requirement record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrEntry {
    pub property: SecurityProperty,
    pub status: UnitStatus,
    pub control: Option<ControlRequirement>,
}

/// Control-requirement record for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetCsrInfo {
    pub asset_id: String,
    pub asset_name: String,
    pub entries: Vec<CsrEntry>,
}
