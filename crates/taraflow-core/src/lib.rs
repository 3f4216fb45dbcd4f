//! Core domain types for the taraflow TARA pipeline.
//!
//! This crate defines the asset model, the five stage-result shapes with
//! their ISO 21434-style rating tables, and the aggregate record families
//! handed to the output sink. It carries no I/O and no async machinery.

pub mod asset;
pub mod attribute;
pub mod control;
pub mod feasibility;
pub mod impact;
pub mod records;
pub mod stage;
pub mod treatment;

pub use asset::{Asset, AssetError, AssetKind, SecurityProperty};
pub use attribute::PropertyAssessment;
pub use control::ControlRequirement;
pub use feasibility::{
    AttackFeasibilityRating, Equipment, Expertise, KnowledgeOfToe,
    ThreatScenarioAttackFeasibility, TimeConsuming, WindowOfOpportunity,
};
pub use impact::{DamageScenarioImpactLevel, SeverityLevel};
pub use records::{AssetCsrInfo, AssetTaraInfo, CsrEntry, MISSING_FIELD, TaraEntry};
pub use stage::{StageKind, StageOutput, StageResults, UnitStatus};
pub use treatment::{RiskTreatmentDecision, RiskTreatmentOption, risk_value};
