//! Tabular report rendering for the two record families.
//!
//! Writes semicolon-delimited tables (`tara.csv`, `csr.csv`) plus a short
//! run summary. Fields whose stage never completed carry the explicit
//! missing marker so a consumer can tell "analyzed, low risk" from "not
//! analyzed".

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use taraflow_core::{AssetCsrInfo, AssetTaraInfo, MISSING_FIELD, UnitStatus};

const DELIMITER: char = ';';

const TARA_FIELDS: [&str; 30] = [
    "asset_id",
    "asset_name",
    "security_property",
    "status",
    "relevance_score",
    "rationale",
    "damage_scenario_id",
    "damage_scenario",
    "safety",
    "financial",
    "operational",
    "privacy",
    "impact_level",
    "threat_scenario_id",
    "threat_scenario",
    "attack_path",
    "time_consuming",
    "expertise",
    "knowledge_about_toe",
    "window_of_opportunity",
    "equipment",
    "difficulty",
    "attack_feasibility_rating",
    "risk_value",
    "risk_treatment",
    "item_change",
    "cybersecurity_goal_id",
    "cybersecurity_goal",
    "cybersecurity_claim_id",
    "cybersecurity_claim",
];

const CSR_FIELDS: [&str; 9] = [
    "asset_id",
    "asset_name",
    "security_property",
    "status",
    "cybersecurity_control_id",
    "cybersecurity_control",
    "allocated_to_device",
    "cybersecurity_requirement_id",
    "cybersecurity_requirement",
];

fn sanitize_cell(value: &str) -> String {
    value
        .replace(DELIMITER, ",")
        .replace('\n', " ")
        .replace('\r', " ")
        .trim()
        .to_string()
}

fn numbered_id(prefix: &str, index: usize) -> String {
    format!("{}_{:05}", prefix, index + 1)
}

fn push_row(out: &mut String, cells: &[String]) {
    out.push_str(&cells.join(&DELIMITER.to_string()));
    out.push('\n');
}

pub fn tara_table(records: &[AssetTaraInfo]) -> String {
    let mut out = String::new();
    push_row(
        &mut out,
        &TARA_FIELDS.iter().map(|f| f.to_string()).collect::<Vec<_>>(),
    );

    let mut row_index = 0usize;
    for record in records {
        for entry in &record.entries {
            let mut cells = vec![
                sanitize_cell(&record.asset_id),
                sanitize_cell(&record.asset_name),
                entry.property.as_str().to_string(),
                entry.status.as_str().to_string(),
            ];

            match &entry.attribute {
                Some(attribute) => {
                    cells.push(attribute.relevance_score.to_string());
                    cells.push(sanitize_cell(&attribute.rationale));
                }
                None => cells.extend([MISSING_FIELD.to_string(), MISSING_FIELD.to_string()]),
            }

            match &entry.damage {
                Some(damage) => {
                    cells.push(numbered_id("DS", row_index));
                    cells.push(sanitize_cell(&damage.damage_scenario));
                    cells.push(damage.safety.as_str().to_string());
                    cells.push(damage.financial.as_str().to_string());
                    cells.push(damage.operational.as_str().to_string());
                    cells.push(damage.privacy.as_str().to_string());
                    cells.push(damage.impact_level().as_str().to_string());
                }
                None => cells.extend(std::iter::repeat_n(MISSING_FIELD.to_string(), 7)),
            }

            match &entry.threat {
                Some(threat) => {
                    cells.push(numbered_id("TS", row_index));
                    cells.push(sanitize_cell(&threat.threat_scenario));
                    cells.push(sanitize_cell(&threat.attack_path));
                    cells.push(threat.time_consuming.as_str().to_string());
                    cells.push(threat.expertise.as_str().to_string());
                    cells.push(threat.knowledge_about_toe.as_str().to_string());
                    cells.push(threat.window_of_opportunity.as_str().to_string());
                    cells.push(threat.equipment.as_str().to_string());
                    cells.push(threat.difficulty().to_string());
                    cells.push(threat.feasibility_rating().as_str().to_string());
                }
                None => cells.extend(std::iter::repeat_n(MISSING_FIELD.to_string(), 10)),
            }

            match &entry.treatment {
                Some(treatment) => {
                    cells.push(treatment.risk_value.to_string());
                    cells.push(treatment.risk_treatment.as_str().to_string());
                    cells.push(sanitize_cell(&treatment.item_change));
                    cells.push(numbered_id("CG", row_index));
                    cells.push(sanitize_cell(&treatment.cybersecurity_goal));
                    cells.push(numbered_id("CCL", row_index));
                    cells.push(sanitize_cell(&treatment.cybersecurity_claim));
                }
                None => cells.extend(std::iter::repeat_n(MISSING_FIELD.to_string(), 7)),
            }

            push_row(&mut out, &cells);
            row_index += 1;
        }
    }
    out
}

pub fn csr_table(records: &[AssetCsrInfo]) -> String {
    let mut out = String::new();
    push_row(
        &mut out,
        &CSR_FIELDS.iter().map(|f| f.to_string()).collect::<Vec<_>>(),
    );

    for record in records {
        for entry in &record.entries {
            let mut cells = vec![
                sanitize_cell(&record.asset_id),
                sanitize_cell(&record.asset_name),
                entry.property.as_str().to_string(),
                entry.status.as_str().to_string(),
            ];
            match &entry.control {
                Some(control) => {
                    cells.push(sanitize_cell(&control.cybersecurity_control_id));
                    cells.push(sanitize_cell(&control.cybersecurity_control));
                    cells.push(if control.allocated_to_device { "yes" } else { "no" }.to_string());
                    cells.push(sanitize_cell(&control.cybersecurity_requirement_id));
                    cells.push(sanitize_cell(&control.cybersecurity_requirement));
                }
                None => cells.extend(std::iter::repeat_n(MISSING_FIELD.to_string(), 5)),
            }
            push_row(&mut out, &cells);
        }
    }
    out
}

/// Markdown run summary with per-status unit counts.
pub fn run_summary(
    tara: &[AssetTaraInfo],
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
) -> String {
    let mut complete = 0usize;
    let mut partial = 0usize;
    let mut failed = 0usize;
    for record in tara {
        for entry in &record.entries {
            match entry.status {
                UnitStatus::Complete => complete += 1,
                UnitStatus::PartiallyComplete => partial += 1,
                UnitStatus::Failed => failed += 1,
            }
        }
    }

    let mut out = String::new();
    out.push_str("# TARA Run Summary\n\n");
    out.push_str(&format!("- Started: {}\n", started_at.to_rfc3339()));
    out.push_str(&format!("- Finished: {}\n", finished_at.to_rfc3339()));
    out.push_str(&format!("- Assets: {}\n", tara.len()));
    out.push_str(&format!(
        "- Units: {} complete, {} partially complete, {} failed\n",
        complete, partial, failed
    ));
    out.push_str("\n| Asset | Units | Complete | Partial | Failed |\n");
    out.push_str("|---|---|---|---|---|\n");
    for record in tara {
        let complete = record
            .entries
            .iter()
            .filter(|e| e.status == UnitStatus::Complete)
            .count();
        let partial = record
            .entries
            .iter()
            .filter(|e| e.status == UnitStatus::PartiallyComplete)
            .count();
        let failed = record
            .entries
            .iter()
            .filter(|e| e.status == UnitStatus::Failed)
            .count();
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            record.asset_id,
            record.entries.len(),
            complete,
            partial,
            failed
        ));
    }
    out
}

pub fn write_reports(
    output_dir: &Path,
    tara: &[AssetTaraInfo],
    csr: &[AssetCsrInfo],
    started_at: DateTime<Utc>,
) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;

    let tara_path = output_dir.join("tara.csv");
    std::fs::write(&tara_path, tara_table(tara))
        .with_context(|| format!("failed to write {}", tara_path.display()))?;
    log::info!("wrote TARA records to {}", tara_path.display());

    let csr_path = output_dir.join("csr.csv");
    std::fs::write(&csr_path, csr_table(csr))
        .with_context(|| format!("failed to write {}", csr_path.display()))?;
    log::info!("wrote CSR records to {}", csr_path.display());

    let summary_path = output_dir.join("summary.md");
    std::fs::write(&summary_path, run_summary(tara, started_at, Utc::now()))
        .with_context(|| format!("failed to write {}", summary_path.display()))?;
    log::info!("wrote run summary to {}", summary_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taraflow_core::{
        ControlRequirement, CsrEntry, DamageScenarioImpactLevel, PropertyAssessment,
        SecurityProperty, SeverityLevel, TaraEntry,
    };

    fn partial_record() -> AssetTaraInfo {
        AssetTaraInfo {
            asset_id: "A-001".to_string(),
            asset_name: "ECU;Gateway".to_string(),
            entries: vec![TaraEntry {
                property: SecurityProperty::Integrity,
                status: UnitStatus::PartiallyComplete,
                attribute: Some(PropertyAssessment {
                    relevance_score: 4,
                    rationale: "multi\nline rationale".to_string(),
                }),
                damage: Some(DamageScenarioImpactLevel {
                    damage_scenario: "firmware replaced".to_string(),
                    safety: SeverityLevel::Severe,
                    financial: SeverityLevel::Moderate,
                    operational: SeverityLevel::Major,
                    privacy: SeverityLevel::Negligible,
                }),
                threat: None,
                treatment: None,
            }],
        }
    }

    #[test]
    fn test_tara_table_marks_missing_stages() {
        let table = tara_table(&[partial_record()]);
        let mut lines = table.lines();
        let header = lines.next().unwrap();
        assert_eq!(header.split(';').count(), TARA_FIELDS.len());

        let row = lines.next().unwrap();
        assert_eq!(row.split(';').count(), TARA_FIELDS.len());
        assert!(row.contains("partially-complete"));
        assert!(row.contains("DS_00001"));
        assert!(row.contains(MISSING_FIELD));
        // The sanitized asset name no longer carries the delimiter.
        assert!(row.contains("ECU,Gateway"));
        assert!(!row.contains("multi\nline"));
    }

    #[test]
    fn test_csr_table_renders_allocation_and_missing() {
        let records = vec![AssetCsrInfo {
            asset_id: "A-001".to_string(),
            asset_name: "ECU-Gateway".to_string(),
            entries: vec![
                CsrEntry {
                    property: SecurityProperty::Integrity,
                    status: UnitStatus::Complete,
                    control: Some(ControlRequirement {
                        cybersecurity_control_id: "CSO-001".to_string(),
                        cybersecurity_control: "authenticate sessions".to_string(),
                        allocated_to_device: true,
                        cybersecurity_requirement_id: "CSR-001".to_string(),
                        cybersecurity_requirement: "reject unauthenticated requests".to_string(),
                    }),
                },
                CsrEntry {
                    property: SecurityProperty::Availability,
                    status: UnitStatus::Failed,
                    control: None,
                },
            ],
        }];
        let table = csr_table(&records);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains(";yes;"));
        assert!(lines[2].contains(MISSING_FIELD));
    }

    #[test]
    fn test_run_summary_counts_statuses() {
        let summary = run_summary(&[partial_record()], Utc::now(), Utc::now());
        assert!(summary.contains("0 complete, 1 partially complete, 0 failed"));
        assert!(summary.contains("| A-001 | 1 | 0 | 1 | 0 |"));
    }
}
