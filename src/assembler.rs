//! Merges per-unit outcomes into the per-asset record families.
//!
//! Every asset yields exactly one TARA record and one CSR record, however
//! many of its units failed. Units that never reached a stage leave `None`
//! slots, which the report layer renders with the explicit missing marker.

use std::sync::Arc;

use taraflow_core::{Asset, AssetCsrInfo, AssetTaraInfo, CsrEntry, TaraEntry};

use crate::orchestrator::UnitOutcome;

pub fn assemble(
    assets: &[Arc<Asset>],
    outcomes: &[UnitOutcome],
) -> (Vec<AssetTaraInfo>, Vec<AssetCsrInfo>) {
    let mut tara_records = Vec::with_capacity(assets.len());
    let mut csr_records = Vec::with_capacity(assets.len());

    for asset in assets {
        let mut tara = AssetTaraInfo {
            asset_id: asset.asset_id.clone(),
            asset_name: asset.asset_name.clone(),
            entries: Vec::new(),
        };
        let mut csr = AssetCsrInfo {
            asset_id: asset.asset_id.clone(),
            asset_name: asset.asset_name.clone(),
            entries: Vec::new(),
        };

        // Entries follow the asset's property expansion order, not the
        // nondeterministic completion order, so reruns merge identically.
        for property in asset.relevant_properties() {
            let Some(outcome) = outcomes
                .iter()
                .find(|o| o.unit.asset.asset_id == asset.asset_id && o.unit.property == property)
            else {
                continue;
            };
            tara.entries.push(TaraEntry {
                property: outcome.unit.property,
                status: outcome.status,
                attribute: outcome.results.attribute.clone(),
                damage: outcome.results.damage.clone(),
                threat: outcome.results.threat.clone(),
                treatment: outcome.results.treatment.clone(),
            });
            csr.entries.push(CsrEntry {
                property: outcome.unit.property,
                status: outcome.status,
                control: outcome.results.control.clone(),
            });
        }

        tara_records.push(tara);
        csr_records.push(csr);
    }

    (tara_records, csr_records)
}
